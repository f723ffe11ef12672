#[cfg(feature = "with-milp")]
mod milp_core;

use sched_core::preprocess::Prep;
use sched_core::{CoreError, DatasetBundle, Solver, SolveOutcome};
use tracing::info;

pub struct MilpSolver;

impl MilpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MilpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for MilpSolver {
    fn solve(&self, bundle: &DatasetBundle, prep: &Prep) -> Result<SolveOutcome, CoreError> {
        info!(classes = bundle.classes.len(), "solving dataset with CBC");
        #[cfg(feature = "with-milp")]
        {
            return solve_with_milp(bundle, prep);
        }
        #[cfg(not(feature = "with-milp"))]
        {
            let _ = (bundle, prep);
            Err(CoreError::SolverUnavailable)
        }
    }
}

#[cfg(feature = "with-milp")]
fn solve_with_milp(bundle: &DatasetBundle, prep: &Prep) -> Result<SolveOutcome, CoreError> {
    use good_lp::{default_solver, ProblemVariables, ResolutionError, SolverModel};
    use milp_core::*;

    let mut pvars = ProblemVariables::new();
    let w = declare_w(prep, &mut pvars);
    let x = declare_x(prep, &mut pvars);
    let v = Vars { w, x };

    if v.w.is_empty() {
        return Err(CoreError::NoFeasibleSchedule);
    }

    let objective = build_objective(bundle, prep, &v);

    let mut model = pvars.minimise(objective.clone()).using(default_solver);
    model = add_assignment_constraints(model, prep, &v);
    model = add_coupling_constraints(model, prep, &v);
    model = add_lecturer_exclusivity_constraints(model, bundle, &v);
    model = add_room_exclusivity_constraints(model, bundle, &v);

    // `Infeasible`/`Unbounded` are genuine outcomes of the search over this
    // dataset's candidate sets; `Other`/`Str` mean CBC itself couldn't run
    // (e.g. the native library failed to load), which is a backend
    // unavailability, not a statement about this dataset's feasibility.
    let sol = model.solve().map_err(|e| match e {
        ResolutionError::Infeasible | ResolutionError::Unbounded => CoreError::NoFeasibleSchedule,
        ResolutionError::Other(_) | ResolutionError::Str(_) => CoreError::SolverUnavailable,
    })?;
    let objective_value = sol.eval(objective);

    let assignments =
        extract_solution(bundle, prep, &v, &sol).map_err(CoreError::IncompleteAssignment)?;

    // CBC is invoked here with no time or gap limit, so a returned `Ok`
    // solution is always a proven-optimal, feasible one: `NotFeasible`/
    // `NotOptimal` never need to be constructed on this path. Those two
    // status variants exist for the schema's benefit and for infeasibility
    // classified before this point (see `CoreError::NoFeasibleSchedule`
    // above), not for a relaxed or time-limited solve this code never runs.
    Ok(SolveOutcome {
        solver_status: types::SolverStatus::Feasible,
        status: types::SolutionStatus::Optimal,
        objective_value,
        assignments,
    })
}
