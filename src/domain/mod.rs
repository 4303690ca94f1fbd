mod embedding;
mod image_analysis;
mod media_id;
mod media_job;
mod media_record;
mod processing_status;
mod service_category;

pub use embedding::Embedding;
pub use image_analysis::ImageAnalysis;
pub use media_id::{MediaId, ServiceId};
pub use media_job::{JobId, MediaJob};
pub use media_record::{FAILED_TAG, MediaRecord, MediaUpdate, MediaWithContext, ServiceContext};
pub use processing_status::ProcessingStatus;
pub use service_category::ServiceCategory;
