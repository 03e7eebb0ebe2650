pub mod plan_reader;

pub use plan_reader::PlanReader;
