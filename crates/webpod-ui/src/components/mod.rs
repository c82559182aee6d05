//! UI components.

pub mod library_nav;
pub mod progress_indicator;
pub mod sync_button;
pub mod sync_preview_dialog;
pub mod toast;

pub use library_nav::LibraryNav;
pub use progress_indicator::ProgressIndicator;
pub use sync_button::{ExportButton, ScanButton, SyncButton};
pub use sync_preview_dialog::SyncPreviewDialog;
pub use toast::{NotificationContext, NotificationProvider, ToastContainer, use_notifications};
