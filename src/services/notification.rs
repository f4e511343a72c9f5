//! Desktop notifications

use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::PlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Keep the notification on screen until dismissed
    pub urgent: bool,
}

impl Notification {
    pub fn timer_finished() -> Self {
        Self {
            title: "Reminder".to_string(),
            body: "Timer Finished! Check the stove.".to_string(),
            urgent: true,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn request_permission(&self) -> BoxFuture<'_, Permission>;

    fn show(&self, notification: Notification) -> BoxFuture<'_, Result<(), PlatformError>>;
}

/// Notifier backed by `notify-send`. Permission is granted when the tool
/// can be executed.
#[derive(Debug)]
pub struct DesktopNotifier {
    program: String,
    granted: AtomicBool,
}

impl DesktopNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            granted: AtomicBool::new(false),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("notify-send")
    }
}

impl Notifier for DesktopNotifier {
    fn request_permission(&self) -> BoxFuture<'_, Permission> {
        Box::pin(async move {
            if self.granted.load(Ordering::SeqCst) {
                return Permission::Granted;
            }

            let available = Command::new(&self.program)
                .arg("--version")
                .output()
                .await
                .map(|output| output.status.success())
                .unwrap_or(false);

            self.granted.store(available, Ordering::SeqCst);
            if available {
                info!("Notifications enabled via {}", self.program);
                Permission::Granted
            } else {
                debug!("{} not available, notifications disabled", self.program);
                Permission::Denied
            }
        })
    }

    fn show(&self, notification: Notification) -> BoxFuture<'_, Result<(), PlatformError>> {
        Box::pin(async move {
            if !self.granted.load(Ordering::SeqCst) {
                return Err(PlatformError::PermissionDenied);
            }

            let urgency = if notification.urgent { "critical" } else { "normal" };
            let output = Command::new(&self.program)
                .arg(format!("--urgency={}", urgency))
                .arg("--app-name=stove-timer")
                .arg(&notification.title)
                .arg(&notification.body)
                .output()
                .await
                .map_err(|e| PlatformError::CommandFailed(format!("Failed to execute {}: {}", self.program, e)))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(PlatformError::CommandFailed(format!("{} failed: {}", self.program, stderr)));
            }

            debug!("Notification shown: {}", notification.title);
            Ok(())
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records what would have been shown
    pub struct RecordingNotifier {
        pub permission: Permission,
        pub shown: Mutex<Vec<Notification>>,
        pub permission_requests: Mutex<usize>,
    }

    impl RecordingNotifier {
        pub fn new(permission: Permission) -> Self {
            Self {
                permission,
                shown: Mutex::new(Vec::new()),
                permission_requests: Mutex::new(0),
            }
        }

        pub fn shown(&self) -> Vec<Notification> {
            self.shown.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn request_permission(&self) -> BoxFuture<'_, Permission> {
            *self.permission_requests.lock().unwrap() += 1;
            Box::pin(async move { self.permission })
        }

        fn show(&self, notification: Notification) -> BoxFuture<'_, Result<(), PlatformError>> {
            Box::pin(async move {
                if self.permission == Permission::Denied {
                    return Err(PlatformError::PermissionDenied);
                }
                self.shown.lock().unwrap().push(notification);
                Ok(())
            })
        }
    }
}
