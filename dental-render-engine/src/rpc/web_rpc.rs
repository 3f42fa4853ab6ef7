use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::dental::registry;
use crate::engine::core::app_state::AppState;
use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::scene::graph::NodeId;
use crate::engine::viewer_state::ViewerState;
use crate::tools::interaction::controller::InteractionEffect;
use crate::tools::view_transition::ViewMode;
use crate::tools::viewer_commands::{
    AutoRotateChangedEvent, CommandSource, InteractionEffectEvent, ViewModeChangedEvent,
    ViewerCommand, ViewerCommandEvent,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Outgoing queues for the embedding page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the parent page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Read-only view of the viewer handed to request handlers.
pub struct RpcContext<'a> {
    pub viewer: &'a ViewerState,
    /// False until the model is registered. Commands are refused before that.
    pub ready: bool,
    pub auto_rotate: bool,
    pub fps: f32,
}

/// Plugin establishing the postMessage bridge for iframe deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    publish_viewer_notifications,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Only string payloads that look like JSON-RPC are queued.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(err) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", err);
        }
    }

    // Ownership moves to JS so the listener outlives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Messages pushed by the JS listener, drained once per frame.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    app_state: Res<State<AppState>>,
    viewer: Res<ViewerState>,
    orbit: Res<OrbitCamera>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut command_events: EventWriter<ViewerCommandEvent>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;
    let ctx = RpcContext {
        viewer: &viewer,
        ready: *app_state.get() == AppState::Running,
        auto_rotate: orbit.auto_rotate,
        fps,
    };

    // Shared across the frame so later requests see what earlier ones queued.
    let mut commands = Vec::new();
    for event in events.read() {
        let response = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                info!("RPC request: {}", request.method);
                handle_rpc_request(&request, &ctx, &mut commands)
            }
            Err(parse_error) => {
                warn!("Malformed RPC message: {}", parse_error);
                let mut error = RpcError::invalid_request("Invalid Request");
                error.data = Some(json!({ "reason": parse_error.to_string() }));
                Some(create_error_response(Value::Null, error))
            }
        };

        if let Some(response) = response {
            rpc_interface.queue_response(response);
        }
    }

    for command in commands {
        command_events.write(ViewerCommandEvent {
            command,
            source: CommandSource::Rpc,
        });
    }
}

/// Handle one request. Commands it triggers are appended to `commands`;
/// requests without an id get no response.
pub fn handle_rpc_request(
    request: &RpcRequest,
    ctx: &RpcContext,
    commands: &mut Vec<ViewerCommand>,
) -> Option<RpcResponse> {
    if request.jsonrpc != "2.0" {
        let mut error = RpcError::invalid_request("Invalid Request");
        error.data = Some(json!({ "jsonrpc": request.jsonrpc }));
        return Some(create_error_response(
            request.id.clone().unwrap_or(Value::Null),
            error,
        ));
    }

    let result = match request.method.as_str() {
        "set_auto_rotate" => {
            require_ready(ctx).and_then(|_| handle_set_auto_rotate(&request.params, commands))
        }
        "toggle_auto_rotate" => require_ready(ctx).map(|_| {
            commands.push(ViewerCommand::ToggleAutoRotate);
            json!({ "auto_rotate": !ctx.auto_rotate })
        }),
        "reset_view" => require_ready(ctx).map(|_| {
            commands.push(ViewerCommand::ResetView);
            json!({ "success": true })
        }),
        "set_view_mode" => {
            require_ready(ctx).and_then(|_| handle_set_view_mode(&request.params, ctx, commands))
        }
        "close_selection" => require_ready(ctx).map(|_| {
            commands.push(ViewerCommand::CloseSelection);
            json!({ "success": true })
        }),
        "get_tooth_data" => handle_get_tooth_data(&request.params),
        "get_viewer_state" => Ok(viewer_state_json(ctx)),
        "get_fps" => Ok(json!({ "fps": ctx.fps })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            let id = request.id.clone()?;
            return Some(create_error_response(
                id,
                RpcError::method_not_found(&request.method),
            ));
        }
    };

    // Notifications (no id) never get a response.
    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => create_error_response(id, error),
    })
}

/// Commands only run once the viewer is up; before that they would be dropped.
fn require_ready(ctx: &RpcContext) -> Result<(), RpcError> {
    if ctx.ready {
        Ok(())
    } else {
        Err(RpcError::internal_error("Viewer not ready"))
    }
}

fn handle_set_auto_rotate(
    params: &Value,
    commands: &mut Vec<ViewerCommand>,
) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct AutoRotateParams {
        enabled: bool,
    }

    let parsed = serde_json::from_value::<AutoRotateParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected boolean 'enabled' parameter"))?;

    commands.push(ViewerCommand::SetAutoRotate(parsed.enabled));
    Ok(json!({ "success": true, "auto_rotate": parsed.enabled }))
}

/// `accepted` means the change was queued. It can still be refused when the
/// frame runs it; `view_mode_changed` reports what was actually applied.
fn handle_set_view_mode(
    params: &Value,
    ctx: &RpcContext,
    commands: &mut Vec<ViewerCommand>,
) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct ViewModeParams {
        mode: ViewMode,
    }

    let parsed = serde_json::from_value::<ViewModeParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'mode' parameter: \"default\" or \"perspective\"")
    })?;

    let already_queued = commands
        .iter()
        .any(|command| matches!(command, ViewerCommand::SetViewMode(_)));
    let accepted = !ctx.viewer.view.is_transitioning && !already_queued;
    if accepted {
        commands.push(ViewerCommand::SetViewMode(parsed.mode));
    }
    Ok(json!({
        "accepted": accepted,
        "mode": parsed.mode,
        "current_view": ctx.viewer.view.current_view,
    }))
}

fn handle_get_tooth_data(params: &Value) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct ToothParams {
        mesh: String,
    }

    let parsed = serde_json::from_value::<ToothParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mesh' parameter"))?;

    let record = registry::lookup(&parsed.mesh);
    serde_json::to_value(record).map_err(|e| RpcError::internal_error(&e.to_string()))
}

fn node_name(viewer: &ViewerState, node: Option<NodeId>) -> Option<String> {
    node.and_then(|id| viewer.scene.node(id))
        .map(|n| n.name.clone())
}

fn viewer_state_json(ctx: &RpcContext) -> Value {
    let viewer = ctx.viewer;
    let interaction = &viewer.interaction;
    let camera = viewer.camera.position();
    let teeth = viewer
        .scene
        .iter()
        .filter(|(_, node)| node.is_tooth() && !node.is_clone())
        .count();

    json!({
        "phase": interaction.phase(),
        "hovered": node_name(viewer, interaction.hovered_tooth),
        "selected": node_name(viewer, interaction.selected_tooth),
        "is_transitioning": interaction.is_transitioning,
        "view_mode": viewer.view.current_view,
        "view_transitioning": viewer.view.is_transitioning,
        "auto_rotate": ctx.auto_rotate,
        "camera_position": [camera.x, camera.y, camera.z],
        "tooth_count": teeth,
    })
}

/// Notification for an interaction effect, if the page cares about it.
pub fn effect_notification(
    viewer: &ViewerState,
    effect: InteractionEffect,
) -> Option<(&'static str, Value)> {
    let tooth_payload = |node: NodeId| {
        let name = node_name(viewer, Some(node))?;
        let record = registry::lookup(&name);
        Some(json!({ "mesh": name, "tooth": record }))
    };

    match effect {
        InteractionEffect::Hovered(node) => Some(("tooth_hovered", tooth_payload(node)?)),
        InteractionEffect::HoverCleared(_) => Some(("tooth_hovered", json!({ "mesh": null }))),
        InteractionEffect::Selected(node) => Some(("tooth_selected", tooth_payload(node)?)),
        InteractionEffect::SelectionCleared => Some(("selection_cleared", json!({}))),
        InteractionEffect::Cursor(_) => None,
    }
}

fn publish_viewer_notifications(
    viewer: Res<ViewerState>,
    mut effects: EventReader<InteractionEffectEvent>,
    mut view_changes: EventReader<ViewModeChangedEvent>,
    mut auto_rotate_changes: EventReader<AutoRotateChangedEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for InteractionEffectEvent(effect) in effects.read() {
        if let Some((method, params)) = effect_notification(&viewer, *effect) {
            rpc_interface.send_notification(method, params);
        }
    }

    for change in view_changes.read() {
        rpc_interface.send_notification(
            "view_mode_changed",
            json!({
                "mode": change.view,
                "cleared_selection": change.cleared_selection,
            }),
        );
    }

    for change in auto_rotate_changes.read() {
        rpc_interface.send_notification(
            "auto_rotate_changed",
            json!({ "enabled": change.enabled }),
        );
    }
}

/// Wrap an error into a response for `id`.
fn create_error_response(id: Value, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(error),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the parent page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    if rpc_interface.outgoing_notifications.is_empty() && rpc_interface.outgoing_responses.is_empty()
    {
        return;
    }

    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::graph::SceneGraph;
    use crate::engine::scene::graph::tests::add_simple_mesh;
    use crate::engine::viewer_state::InteractionTuning;

    fn request(text: &str) -> RpcRequest {
        serde_json::from_str(text).unwrap()
    }

    fn viewer() -> ViewerState {
        let mut scene = SceneGraph::new();
        add_simple_mesh(&mut scene, "Skeletal_Cranium", Vec3::ZERO);
        add_simple_mesh(&mut scene, "1stMolar", Vec3::X);
        ViewerState::new(scene, InteractionTuning::default())
    }

    fn context(viewer: &ViewerState, ready: bool) -> RpcContext<'_> {
        RpcContext {
            viewer,
            ready,
            auto_rotate: false,
            fps: 60.0,
        }
    }

    fn call(viewer: &ViewerState, text: &str) -> (RpcResponse, Vec<ViewerCommand>) {
        let mut commands = Vec::new();
        let response =
            handle_rpc_request(&request(text), &context(viewer, true), &mut commands).unwrap();
        (response, commands)
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let viewer = viewer();
        let (response, commands) =
            call(&viewer, r#"{"jsonrpc":"2.0","method":"explode","params":{},"id":1}"#);
        assert_eq!(response.error.unwrap().code, -32601);
        assert!(commands.is_empty());
    }

    #[test]
    fn bad_params_are_invalid_params() {
        let viewer = viewer();
        for text in [
            r#"{"jsonrpc":"2.0","method":"set_auto_rotate","params":{"enabled":"yes"},"id":1}"#,
            r#"{"jsonrpc":"2.0","method":"set_view_mode","params":{"mode":"exploded"},"id":2}"#,
            r#"{"jsonrpc":"2.0","method":"get_tooth_data","id":3}"#,
        ] {
            let (response, commands) = call(&viewer, text);
            assert_eq!(response.error.unwrap().code, -32602, "{text}");
            assert!(commands.is_empty());
        }
    }

    #[test]
    fn wrong_version_is_invalid_request() {
        let viewer = viewer();
        let (response, _) = call(&viewer, r#"{"jsonrpc":"1.0","method":"get_fps","id":9}"#);
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[test]
    fn commands_are_queued() {
        let viewer = viewer();
        let (_, commands) = call(
            &viewer,
            r#"{"jsonrpc":"2.0","method":"set_view_mode","params":{"mode":"perspective"},"id":1}"#,
        );
        assert_eq!(commands, vec![ViewerCommand::SetViewMode(ViewMode::Perspective)]);

        let (response, commands) = call(
            &viewer,
            r#"{"jsonrpc":"2.0","method":"set_auto_rotate","params":{"enabled":true},"id":2}"#,
        );
        assert_eq!(commands, vec![ViewerCommand::SetAutoRotate(true)]);
        assert_eq!(response.result.unwrap()["auto_rotate"], json!(true));
    }

    #[test]
    fn notifications_without_id_get_no_response() {
        let viewer = viewer();
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"reset_view"}"#),
            &context(&viewer, true),
            &mut commands,
        );
        assert!(response.is_none());
        assert_eq!(commands, vec![ViewerCommand::ResetView]);
    }

    #[test]
    fn commands_are_refused_while_loading() {
        let viewer = viewer();
        let ctx = context(&viewer, false);
        for text in [
            r#"{"jsonrpc":"2.0","method":"reset_view","id":1}"#,
            r#"{"jsonrpc":"2.0","method":"set_view_mode","params":{"mode":"perspective"},"id":2}"#,
            r#"{"jsonrpc":"2.0","method":"set_auto_rotate","params":{"enabled":true},"id":3}"#,
            r#"{"jsonrpc":"2.0","method":"toggle_auto_rotate","id":4}"#,
            r#"{"jsonrpc":"2.0","method":"close_selection","id":5}"#,
        ] {
            let mut commands = Vec::new();
            let response = handle_rpc_request(&request(text), &ctx, &mut commands).unwrap();
            let error = response.error.unwrap();
            assert_eq!(error.code, -32603, "{text}");
            assert_eq!(error.message, "Viewer not ready");
            assert!(response.result.is_none());
            assert!(commands.is_empty(), "{text}");
        }

        // Queries still answer.
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"get_fps","id":6}"#),
            &ctx,
            &mut commands,
        )
        .unwrap();
        assert!(response.error.is_none());
    }

    #[test]
    fn second_view_change_in_one_frame_is_not_accepted() {
        let viewer = viewer();
        let ctx = context(&viewer, true);
        let text =
            r#"{"jsonrpc":"2.0","method":"set_view_mode","params":{"mode":"perspective"},"id":1}"#;

        let mut commands = Vec::new();
        let first = handle_rpc_request(&request(text), &ctx, &mut commands).unwrap();
        let second = handle_rpc_request(&request(text), &ctx, &mut commands).unwrap();

        assert_eq!(first.result.unwrap()["accepted"], json!(true));
        assert_eq!(second.result.unwrap()["accepted"], json!(false));
        assert_eq!(commands, vec![ViewerCommand::SetViewMode(ViewMode::Perspective)]);
    }

    #[test]
    fn tooth_data_uses_registry() {
        let viewer = viewer();
        let (response, _) = call(
            &viewer,
            r#"{"jsonrpc":"2.0","method":"get_tooth_data","params":{"mesh":"1stMolar"},"id":1}"#,
        );
        let result = response.result.unwrap();
        assert_eq!(result["dental_number"], json!("46"));

        let (response, _) = call(
            &viewer,
            r#"{"jsonrpc":"2.0","method":"get_tooth_data","params":{"mesh":"nope"},"id":2}"#,
        );
        assert_eq!(response.result.unwrap()["display_name"], json!("Unknown Tooth"));
    }

    #[test]
    fn viewer_state_reports_phase_and_view() {
        let viewer = viewer();
        let (response, _) = call(&viewer, r#"{"jsonrpc":"2.0","method":"get_viewer_state","id":1}"#);
        let result = response.result.unwrap();
        assert_eq!(result["phase"], json!("idle"));
        assert_eq!(result["view_mode"], json!("default"));
        assert_eq!(result["tooth_count"], json!(1));
        assert_eq!(result["selected"], Value::Null);
    }

    #[test]
    fn hover_effect_becomes_tooth_notification() {
        let viewer = viewer();
        let tooth = viewer.scene.find_by_name("1stMolar").unwrap();
        let (method, params) =
            effect_notification(&viewer, InteractionEffect::Hovered(tooth)).unwrap();
        assert_eq!(method, "tooth_hovered");
        assert_eq!(params["tooth"]["dental_number"], json!("46"));
        assert!(effect_notification(
            &viewer,
            InteractionEffect::Cursor(crate::tools::interaction::state::CursorStyle::Pointer)
        )
        .is_none());
    }
}
