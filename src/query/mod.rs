// Submodules for separation of concerns
mod eval;
mod exec;
mod types;

// Public API re-exports
pub use eval::{compare_bson, compare_docs, eval_filter, eval_with_text};
pub use exec::{
    apply_update, count_docs, delete_many, delete_one, find_docs, find_one, insert_unless, sum_field, update_many,
    update_one,
};
pub use types::{CmpOp, DeleteReport, Filter, FindOptions, Order, SortSpec, UpdateDoc, UpdateReport};
