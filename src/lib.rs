pub mod layout;
pub mod checksum;
pub mod field;
pub mod project;
pub mod container;
pub mod sidecar;

pub use checksum::checksum;
pub use container::{ContainerError, ELangFile, ErrorKind};
pub use field::{FieldError, IntField, TextField};
pub use project::{FieldName, FieldValue, ProjectInfo};
pub use sidecar::{ProjectSummary, SummaryKey};
