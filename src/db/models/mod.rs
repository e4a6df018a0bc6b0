pub mod app_segment;
pub mod segment;

pub use app_segment::AppSegmentRecord;
pub use segment::SegmentRecord;
