mod content;
mod record;

pub use content::ContentEntry;
pub use record::{
  AdminSession, AdminUser, ClientProfile, Inquiry, NewInquiry, NewProfile, RecordStatus,
};
