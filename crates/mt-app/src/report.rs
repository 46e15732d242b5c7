//! Conversion of pipeline outputs into storable records.

use mt_controls::{PidGains, PlantParameters, TransferFunction};
use mt_ident::IdentificationResult;
use mt_results::{
    GainsRecord, IdentificationRecord, MetricsRecord, PlantRecord, TrajectoryRecord,
    TuningRecord, finite,
};
use mt_sim::{PerformanceMetrics, Trajectory};
use mt_tune::TuneOutcome;

pub fn plant_record(params: &PlantParameters, plant: &TransferFunction) -> PlantRecord {
    PlantRecord {
        r: params.r,
        l: params.l,
        j: params.j,
        b: params.b,
        kt: params.kt,
        ke: params.ke,
        include_inductance: params.include_inductance,
        num: plant.num().to_vec(),
        den: plant.den().to_vec(),
    }
}

pub fn identification_record(result: &IdentificationResult) -> IdentificationRecord {
    IdentificationRecord {
        estimated_j: result.estimated_j,
        estimated_b: result.estimated_b,
        rmse: result.rmse,
        iterations: result.iterations,
        evaluations: result.evaluations,
        converged: result.converged,
        j_at_bound: result.j_at_bound,
        b_at_bound: result.b_at_bound,
    }
}

pub fn metrics_record(m: &PerformanceMetrics) -> MetricsRecord {
    MetricsRecord {
        steady_state_value: finite(m.steady_state_value),
        percent_overshoot: finite(m.percent_overshoot),
        settling_time: finite(m.settling_time),
        rise_time: finite(m.rise_time),
        steady_state_error: finite(m.steady_state_error),
        integral_absolute_error: finite(m.integral_absolute_error),
    }
}

fn gains_record(g: &PidGains) -> GainsRecord {
    GainsRecord {
        kp: g.kp,
        ki: g.ki,
        kd: g.kd,
        derivative_filter: g.filter.enabled,
        filter_time_constant: g.filter.time_constant,
    }
}

pub fn tuning_record(outcome: &TuneOutcome) -> TuningRecord {
    TuningRecord {
        gains: gains_record(&outcome.gains),
        grid_gains: gains_record(&outcome.grid_gains),
        closed_loop_num: outcome.closed_loop.num().to_vec(),
        closed_loop_den: outcome.closed_loop.den().to_vec(),
        metrics: metrics_record(&outcome.metrics),
        p_only_metrics: metrics_record(&outcome.p_only.metrics),
        pi_only_metrics: metrics_record(&outcome.pi_only.metrics),
        grid_score: outcome.scores.grid,
        nelder_mead_score: outcome.scores.nelder_mead,
        powell_score: outcome.scores.powell,
        final_score: outcome.scores.final_score,
        evaluations: outcome.evaluations,
    }
}

fn trajectory(label: &str, t: &Trajectory) -> TrajectoryRecord {
    TrajectoryRecord::new(label, &t.t, &t.y)
}

/// Every trajectory a run produced, in a fixed order.
pub fn trajectory_records(
    identification: Option<&IdentificationResult>,
    tuning: Option<&TuneOutcome>,
) -> Vec<TrajectoryRecord> {
    let mut records = Vec::new();
    if let Some(id) = identification {
        records.push(trajectory("measured", &id.measured));
        records.push(trajectory("fitted", &id.fitted));
    }
    if let Some(tune) = tuning {
        records.push(trajectory("pid", &tune.optimized.trajectory));
        records.push(trajectory("p_only", &tune.p_only.trajectory));
        records.push(trajectory("pi_only", &tune.pi_only.trajectory));
    }
    records
}
