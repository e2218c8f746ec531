//! Load a document into a fresh scope and report on it

use std::rc::Rc;

use anyhow::{Context, Result};
use seisdm_datamodel::{ChannelNotifier, ConfigRecord, Notification, Object, Scope};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::document;
use crate::printer::TreePrinter;

/// Outcome of one inspection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Rendered object tree
    pub tree: String,
    /// Objects reached by the traversal
    pub objects: usize,
    /// Live entries in the scope registry after loading
    pub registered: usize,
    /// Notifications received by the consumer task
    pub notifications: usize,
}

pub async fn run(config: &AppConfig) -> Result<Report> {
    let record = document::read_record(&config.document).await?;

    let scope = Scope::new(config.scope_name.clone(), &config.model)
        .context("Invalid data model configuration")?;
    let (notifier, receiver) = ChannelNotifier::new();
    scope.set_notifier(Rc::new(notifier));
    let consumer = spawn_consumer(receiver);

    let root = record
        .build(&scope)
        .with_context(|| format!("Failed to build document {}", config.document.display()))?;
    tracing::info!(
        scope = scope.name(),
        public_id = %record.public_id,
        parameter_sets = root.borrow().parameter_set_count(),
        "document loaded"
    );

    let mut printer = TreePrinter::new();
    root.borrow().accept(&mut printer);
    let objects = printer.objects();

    if let Some(export) = &config.export {
        let exported = ConfigRecord::from(&*root.borrow());
        document::write_record(export, &exported).await?;
        tracing::info!(path = %export.display(), "document exported");
    }

    let registered = scope.registry().len();

    // Dropping the notifier closes the channel and ends the consumer
    scope.clear_notifier();
    let notifications = consumer
        .await
        .context("Notification consumer stopped unexpectedly")?;

    Ok(Report {
        tree: printer.into_output(),
        objects,
        registered,
        notifications,
    })
}

fn spawn_consumer(mut receiver: mpsc::UnboundedReceiver<Notification>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut received = 0;
        while let Some(notification) = receiver.recv().await {
            tracing::debug!(
                operation = %notification.operation,
                parent = %notification.parent_id,
                class = %notification.class_name,
                key = %notification.key,
                "notification"
            );
            received += 1;
        }
        received
    })
}
