//! Describe a batch of stills and merge the answers into one description.

use bytes::Bytes;
use std::sync::Arc;

use onereel_core::models::DescriptionRequest;
use onereel_core::GatherPolicy;
use onereel_plugins::DescriptionService;

use crate::error::PipelineError;
use crate::scatter_gather::{scatter_gather, GatherError};

#[derive(Debug, Clone)]
pub struct DescriptionAggregator {
    service: Arc<dyn DescriptionService>,
    policy: GatherPolicy,
}

impl DescriptionAggregator {
    pub fn new(service: Arc<dyn DescriptionService>, policy: GatherPolicy) -> Self {
        Self { service, policy }
    }

    pub fn service(&self) -> &Arc<dyn DescriptionService> {
        &self.service
    }

    pub fn policy(&self) -> GatherPolicy {
        self.policy
    }

    /// Describe every buffer concurrently with the same prompt.
    ///
    /// A single buffer returns its text verbatim; several are joined with one
    /// space in buffer order, whatever order the calls complete in.
    pub async fn describe(&self, buffers: &[Bytes], prompt: &str) -> Result<String, PipelineError> {
        if buffers.is_empty() {
            return Err(PipelineError::InvalidInput(
                "no stills to describe".to_string(),
            ));
        }

        tracing::debug!(
            service = self.service.name(),
            buffer_count = buffers.len(),
            policy = ?self.policy,
            "Dispatching description requests"
        );

        let calls = buffers.iter().enumerate().map(|(index, buffer)| {
            let request = DescriptionRequest {
                image_bytes: buffer.clone(),
                prompt: prompt.to_string(),
            };
            async move {
                let text = self.service.describe_one(request).await?;
                tracing::debug!(index, description_length = text.len(), "Still described");
                Ok::<_, PipelineError>(text)
            }
        });

        let texts = scatter_gather(calls, self.policy)
            .await
            .map_err(|err: GatherError<PipelineError>| match err.into_first_error() {
                Some(err) => err,
                None => PipelineError::InvalidInput("no descriptions were produced".to_string()),
            })?;

        Ok(texts.join(" "))
    }
}
