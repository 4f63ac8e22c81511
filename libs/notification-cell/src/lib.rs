// =====================================================================================
// NOTIFICATION CELL - ACTIVATION EMAILS OFF THE REQUEST PATH
// =====================================================================================
//
// Registration hands a notice to the dispatcher and returns. A single worker
// task drains the queue, issues the activation token and talks to the mail
// relay. Delivery failures end up in the logs and nowhere else.
//
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{NewAccountNotice, OutgoingEmail};
pub use services::dispatcher::{spawn_notification_worker, NotificationDispatcher, NotificationWorker};
pub use services::mailer::{mailer_from_config, HttpMailer, LogMailer, MailError, Mailer};
