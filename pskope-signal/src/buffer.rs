//! Immutable per-stage sample storage

use crate::stage::Stage;
use std::ops::Deref;
use std::sync::Arc;

/// Ordered, immutable sequence of samples for one stage
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSequence(Arc<[f32]>);

impl SampleSequence {
    /// An empty sequence (what an absent stage decodes to)
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Largest absolute value, 0.0 for an empty or all-zero sequence
    pub fn peak(&self) -> f32 {
        self.0
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}

impl Default for SampleSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<f32>> for SampleSequence {
    fn from(samples: Vec<f32>) -> Self {
        Self(Arc::from(samples))
    }
}

impl From<&[f32]> for SampleSequence {
    fn from(samples: &[f32]) -> Self {
        Self(Arc::from(samples))
    }
}

impl Deref for SampleSequence {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

/// All six stage sequences derived from one upload
///
/// Only constructible through [`SampleBufferBuilder::build`], so a buffer
/// always holds every stage; stages the builder never saw are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sequences: [SampleSequence; 6],
    source: Option<String>,
}

impl SampleBuffer {
    pub fn builder() -> SampleBufferBuilder {
        SampleBufferBuilder::default()
    }

    /// Sequence for a stage
    pub fn get(&self, stage: Stage) -> &SampleSequence {
        &self.sequences[stage.index()]
    }

    /// Name of the upload the buffer was derived from, if known
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Iterate stages in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &SampleSequence)> {
        Stage::ALL.into_iter().map(move |stage| (stage, self.get(stage)))
    }

    /// True when every stage is empty
    pub fn is_blank(&self) -> bool {
        self.sequences.iter().all(|s| s.is_empty())
    }
}

/// Collects stage sequences before a [`SampleBuffer`] is published
#[derive(Debug, Default)]
pub struct SampleBufferBuilder {
    sequences: [Option<SampleSequence>; 6],
    source: Option<String>,
}

impl SampleBufferBuilder {
    pub fn stage(mut self, stage: Stage, samples: impl Into<SampleSequence>) -> Self {
        self.sequences[stage.index()] = Some(samples.into());
        self
    }

    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.source = Some(name.into());
        self
    }

    pub fn build(self) -> SampleBuffer {
        let missing = self.sequences.iter().filter(|s| s.is_none()).count();
        if missing > 0 {
            tracing::debug!(missing, "stages absent from result, treating as empty");
        }

        SampleBuffer {
            sequences: self.sequences.map(Option::unwrap_or_default),
            source: self.source,
        }
    }
}
