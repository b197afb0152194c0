pub mod arithmetic;
pub mod comparison;
pub mod evaluator;
pub mod indexing;
pub mod logical;
pub mod optimizer;
pub mod type_casting;
pub mod utils;

// Re-export the main public items
pub use comparison::compare;
pub use evaluator::{EmptyContext, EvaluationContext, EvaluationStack, Evaluator, VariableContext, AUTO_RANGE_PARAMETER};
pub use optimizer::optimize;
pub use utils::{compute_index, compute_index_array};
