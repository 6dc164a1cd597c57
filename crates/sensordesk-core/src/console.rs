// ── Console ──
//
// Top-level handle: one gateway, one notifier, an optional confirmation
// gate, and a `ResourceBinding` per resource kind on demand. Collaborators
// are injected explicitly; nothing is looked up globally.

use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use sensordesk_api::RestClient;

use crate::compose::{ResourceBinding, ResourceBindingBuilder};
use crate::config::ConsoleConfig;
use crate::confirm::ConfirmationGate;
use crate::error::CoreError;
use crate::gateway::{Gateway, RestGateway};
use crate::model::{Item, ResourceKind};
use crate::notify::Notifier;
use crate::transform::{self, FieldTransform};

pub struct Console {
    config: ConsoleConfig,
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notifier>,
    gate: Option<Arc<dyn ConfirmationGate>>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("base_url", &self.config.base_url.as_str())
            .field("gated", &self.gate.is_some())
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Assemble from already-built collaborators.
    pub fn new(
        config: ConsoleConfig,
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
        gate: Option<Arc<dyn ConfirmationGate>>,
    ) -> Self {
        Self {
            config,
            gateway,
            notifier,
            gate,
        }
    }

    /// Build the HTTP transport from `config` and assemble a console over it.
    pub fn connect(
        config: ConsoleConfig,
        notifier: Arc<dyn Notifier>,
        gate: Option<Arc<dyn ConfirmationGate>>,
    ) -> Result<Self, CoreError> {
        let client = RestClient::new(config.base_url.as_str(), &config.transport())?;
        info!(base_url = %client.base_url(), "console connected");
        let gateway: Arc<dyn Gateway> = Arc::new(RestGateway::new(client));
        Ok(Self::new(config, gateway, notifier, gate))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Builder pre-loaded with this console's collaborators and the
    /// kind's default transforms. Callers may override any of it.
    pub fn binding(&self, kind: ResourceKind) -> ResourceBindingBuilder {
        let builder =
            ResourceBinding::builder(kind, self.gateway.clone(), self.notifier.clone())
                .outbound(outbound_for(kind))
                .display(display_for(kind))
                .key_offset(self.config.key_offset);
        match &self.gate {
            Some(gate) if self.config.confirm_deletes => builder.confirm_with(gate.clone()),
            _ => builder,
        }
    }

    /// Bind `kind` over a caller-supplied seed.
    pub fn bind(&self, kind: ResourceKind, seed: Vec<Item>) -> ResourceBinding {
        self.binding(kind).seed(seed).build()
    }

    /// Fetch the collection for `kind` and bind over it.
    pub async fn open(&self, kind: ResourceKind) -> Result<ResourceBinding, CoreError> {
        let seed = self
            .gateway
            .fetch_collection(kind.path(), kind.rel())
            .await?;
        debug!(%kind, count = seed.len(), "collection fetched");
        Ok(self.bind(kind, seed))
    }

    /// Open every resource kind concurrently.
    pub async fn open_all(&self) -> Result<Vec<ResourceBinding>, CoreError> {
        try_join_all(ResourceKind::iter().map(|kind| self.open(kind))).await
    }
}

// ── Default transforms per kind ─────────────────────────────────────

/// Numeric fields users type with grouping separators.
fn numeric_fields(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Sensors => &["minValue", "maxValue", "interval"],
        ResourceKind::Actuators => &["value"],
        ResourceKind::Rules => &["threshold", "hysteresis"],
        ResourceKind::Devices | ResourceKind::Users | ResourceKind::Models => &[],
    }
}

/// Epoch-millisecond fields shown as wall-clock time.
fn timestamp_fields(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Devices => &["createdAt", "lastSeen"],
        ResourceKind::Sensors => &["createdAt", "lastReading"],
        ResourceKind::Users => &["createdAt", "lastLogin"],
        ResourceKind::Actuators | ResourceKind::Rules | ResourceKind::Models => &["createdAt"],
    }
}

pub fn outbound_for(kind: ResourceKind) -> FieldTransform {
    match numeric_fields(kind) {
        [] => transform::identity(),
        fields => transform::normalize_numbers(fields),
    }
}

pub fn display_for(kind: ResourceKind) -> FieldTransform {
    transform::format_timestamps(timestamp_fields(kind))
}
