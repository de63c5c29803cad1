//! Client layer for the MathBank problem manager.
//!
//! # Responsibility
//! - Drive the endpoint surface through a typed API proxy.
//! - Model the page controls: keyword chip input, result table, modal
//!   dialogs and the session that coordinates them.
//!
//! # Invariants
//! - One user action issues its requests and drives exactly one table
//!   refresh on success.
//! - A failed request is logged and leaves the view state untouched.

pub mod keyword_input;
pub mod modal;
pub mod proxy;
pub mod session;
pub mod table;
pub mod transport;

pub use keyword_input::{Key, KeywordInput, ListenerHandle};
pub use modal::{EditMode, EditModal, EmptyTrashModal, TrashModal};
pub use proxy::{ApiProxy, ClientError, MoveDir, ProblemView};
pub use session::AppSession;
pub use table::{render_result_table, ResultTable, RowAction, TableMode, TableRow};
pub use transport::{ApiRequest, Method, Transport, TransportError};
