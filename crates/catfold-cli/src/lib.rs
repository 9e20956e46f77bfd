pub mod folds;
pub mod train;
pub mod util;
