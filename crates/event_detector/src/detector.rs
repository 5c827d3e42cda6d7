//! Policy selection per event kind.

use contracts::{
    channels, AebDetectionPolicy, ChannelStore, ContractError, EventBoundary, EventKind,
    SegmentationParams,
};
use tracing::{debug, instrument, warn};

use crate::aeb::{detect_aeb_derivative, detect_aeb_transitions, AebDetection};
use crate::fcw::{detect_fcw_edges, merge_events};

/// Policy that produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPolicy {
    AebTransition,
    AebDerivative,
    FcwEdges,
}

/// Boundaries of one kind found in one recording
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub kind: EventKind,
    pub policy: DetectionPolicy,
    /// Time-ordered boundaries
    pub boundaries: Vec<EventBoundary>,
    /// Ends synthesized because the signal stayed active
    pub synthesized_ends: usize,
    /// Raw events absorbed by merging
    pub merged_events: usize,
}

/// Event boundary detector
#[derive(Debug, Clone, Default)]
pub struct EventDetector {
    params: SegmentationParams,
}

impl EventDetector {
    pub fn new(params: SegmentationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    /// Detect events of `kind` in `store`
    ///
    /// # Errors
    /// Returns `MissingSignal` when the trigger channel of every applicable
    /// policy is absent.
    #[instrument(level = "debug", skip(self, store), fields(recording = store.name()))]
    pub fn detect<S: ChannelStore + ?Sized>(
        &self,
        store: &S,
        kind: EventKind,
    ) -> Result<Detection, ContractError> {
        let detection = match kind {
            EventKind::Aeb => self.detect_aeb(store)?,
            EventKind::Fcw => self.detect_fcw(store)?,
        };
        debug!(
            kind = %kind,
            events = detection.boundaries.len(),
            policy = ?detection.policy,
            "event detection finished"
        );
        Ok(detection)
    }

    fn detect_aeb<S: ChannelStore + ?Sized>(&self, store: &S) -> Result<Detection, ContractError> {
        let p = &self.params;
        let time = store.time();

        if p.aeb_policy == AebDetectionPolicy::Transition {
            if let Some(request) = store.channel(channels::AEB_REQUEST) {
                let d = detect_aeb_transitions(
                    time,
                    request,
                    &p.aeb_active_levels,
                    &p.aeb_end_levels,
                    p.aeb_post_time,
                );
                return Ok(Self::aeb_detection(d, DetectionPolicy::AebTransition));
            }
            warn!(
                channel = channels::AEB_REQUEST,
                "request channel missing, falling back to derivative policy"
            );
        }

        let decel = store
            .channel(channels::AEB_TARGET_DECEL)
            .ok_or_else(|| ContractError::missing_signal(channels::AEB_TARGET_DECEL))?;
        let d = detect_aeb_derivative(
            time,
            decel,
            p.derivative_start_thd,
            p.derivative_end_thd,
            p.derivative_pb_target,
            p.aeb_post_time,
        );
        Ok(Self::aeb_detection(d, DetectionPolicy::AebDerivative))
    }

    fn aeb_detection(d: AebDetection, policy: DetectionPolicy) -> Detection {
        Detection {
            kind: EventKind::Aeb,
            policy,
            boundaries: d.boundaries,
            synthesized_ends: d.synthesized_ends,
            merged_events: 0,
        }
    }

    fn detect_fcw<S: ChannelStore + ?Sized>(&self, store: &S) -> Result<Detection, ContractError> {
        let request = store
            .channel(channels::FCW_REQUEST)
            .ok_or_else(|| ContractError::missing_signal(channels::FCW_REQUEST))?;

        let raw = detect_fcw_edges(store.time(), request, &self.params.fcw_active_levels);
        let merged = merge_events(&raw, self.params.fcw_merge_window);
        let still_active = request.last().is_some_and(|&v| v != 0.0) && !raw.is_empty();

        Ok(Detection {
            kind: EventKind::Fcw,
            policy: DetectionPolicy::FcwEdges,
            merged_events: raw.len() - merged.len(),
            synthesized_ends: usize::from(still_active),
            boundaries: merged,
        })
    }
}
