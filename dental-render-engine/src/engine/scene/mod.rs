pub mod graph;
pub mod ray;
