//! Partial / full braking classification on the target deceleration

use contracts::{channels, columns, ColumnType};
use signal_tools::{matching_indices, Comparison};

use super::{fallback, ColumnDef, EventContext, KpiCalculator, RowWriter};

const COLUMNS: &[ColumnDef] = &[
    (columns::PB_DUR, ColumnType::Double, "s"),
    (columns::FB_DUR, ColumnType::Double, "s"),
    (columns::IS_PB_ON, ColumnType::Boolean, ""),
    (columns::IS_FB_ON, ColumnType::Boolean, ""),
];

/// PB/FB activity and durations from the intervention start to the window end
///
/// A sample belongs to a mode when it lies within `tgt_tol` of that mode's
/// target. With `pb_truncate_at_fb` only PB samples before the first FB
/// sample count. Durations are `0.0` for an inactive mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrakeModeCalculator;

fn span(time: &[f64], offset: usize, indices: &[usize]) -> f64 {
    match (indices.first(), indices.last()) {
        (Some(&first), Some(&last)) => {
            let dur = time[offset + last] - time[offset + first];
            if dur.is_finite() {
                dur.max(0.0)
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

impl KpiCalculator for BrakeModeCalculator {
    fn name(&self) -> &'static str {
        "brake_mode"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        out.set(columns::PB_DUR, 0.0);
        out.set(columns::FB_DUR, 0.0);

        let Some(decel) = ctx.channel(channels::AEB_TARGET_DECEL) else {
            fallback(self.name(), ctx, "missing signal aebTargetDecel");
            return;
        };
        let time = ctx.time();
        let n = time.len().min(decel.len());
        let Some(start) = ctx.start_within(n) else {
            fallback(self.name(), ctx, "invalid intervention start index");
            return;
        };

        let aeb = &ctx.params.aeb;
        let segment = &decel[start..n];
        let mut pb = matching_indices(segment, aeb.pb_tgt_decel, Comparison::Equal, aeb.tgt_tol);
        let fb = matching_indices(segment, aeb.fb_tgt_decel, Comparison::Equal, aeb.tgt_tol);

        if aeb.pb_truncate_at_fb {
            if let Some(&first_fb) = fb.first() {
                pb.retain(|&i| i < first_fb);
            }
        }

        out.set(columns::PB_DUR, span(time, start, &pb));
        out.set(columns::FB_DUR, span(time, start, &fb));
        out.set(columns::IS_PB_ON, !pb.is_empty());
        out.set(columns::IS_FB_ON, !fb.is_empty());
    }
}
