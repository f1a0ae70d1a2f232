pub mod partition;
pub mod projection;

pub use partition::{CHAPTER_COUNT, ChapterId, ChapterMap, repartition};
pub use projection::Projection;
