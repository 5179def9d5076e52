pub mod failed_label_writer;
pub mod pdf_writer;
pub mod response;

pub use failed_label_writer::FailedLabelWriter;
pub use pdf_writer::PdfWriter;
pub use response::LabelOutcome;
