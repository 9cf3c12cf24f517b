//! Dashboard Module
//!
//! Plans the calls of every enabled section, resolves them in one gateway
//! batch and derives the sections from the results. A failed call costs
//! the sections that need it, never the whole report.

pub mod report;
pub mod sections;

pub use report::{Metric, Report, SectionReport, SectionValues};
pub use sections::{Section, SectionToggles};

use tracing::{debug, info};

use crate::chain::Chain;
use crate::gateway::{Gateway, RpcCall};

pub struct Dashboard {
    gateway: Gateway,
    chain: Chain,
    toggles: SectionToggles,
}

impl Dashboard {
    pub fn new(gateway: Gateway, chain: Chain, toggles: SectionToggles) -> Self {
        Self {
            gateway,
            chain,
            toggles,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Calls needed by the enabled sections, de-duplicated, first-seen order.
    pub fn plan(&self) -> Vec<RpcCall> {
        let mut calls: Vec<RpcCall> = Vec::new();
        for section in self.toggles.enabled() {
            for call in section.calls(self.chain.dialect()) {
                if !calls.contains(&call) {
                    calls.push(call);
                }
            }
        }
        calls
    }

    pub async fn render(&self) -> Report {
        let calls = self.plan();
        debug!(chain = %self.chain, calls = calls.len(), "Resolving dashboard calls");

        let batch = self.gateway.fetch_many(&calls).await;

        let sections: Vec<SectionReport> = self
            .toggles
            .enabled()
            .into_iter()
            .map(|section| SectionReport {
                section,
                title: section.title(),
                values: section.derive(self.chain, &batch),
            })
            .collect();

        info!(
            chain = %self.chain,
            succeeded = batch.success_count(),
            failed = batch.errors().len(),
            "Dashboard rendered"
        );

        Report {
            chain: self.chain,
            network: self.chain.display_name(),
            sections,
            errors: batch.errors().iter().map(ToString::to_string).collect(),
        }
    }
}
