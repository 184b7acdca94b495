mod inference;

pub use inference::{TypeInferenceVisitor, TypeInferrer};
