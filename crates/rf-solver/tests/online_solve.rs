//! Online Newton solves over a five/five/five reduced operator set.

mod common;

use common::{inlet, linear_ops, scenario_ops, viscosities, with_penalty, zero_ops_with_forcing};
use nalgebra::{DMatrix, DVector};
use rf_solver::{
    BoundaryTreatment, InitialGuess, NewtonArgument, NewtonConfig, PhysicsKind, ReducedProblem,
    SolverError, SteadyNsModel,
};

fn config() -> NewtonConfig {
    NewtonConfig::default()
        .with_tolerance(1e-6)
        .with_max_iterations(20)
}

#[test]
fn parameter_sweep_converges_at_every_sample() {
    let ops = scenario_ops();
    let mut model = SteadyNsModel::new(&ops, 1.0).unwrap();
    model.set_velocity(inlet()).unwrap();

    let mut rows = Vec::new();
    for nu in viscosities() {
        model.set_nu(nu).unwrap();
        let result = model.solve_online(&config()).unwrap();
        assert_eq!(result.y.len(), 15);
        assert!(result.residual_norm < 1e-6);
        assert!(result.iterations >= 1 && result.iterations <= 20);

        // Stored coefficients satisfy the system on their own.
        let r = model.residual(model.coefficients()).unwrap();
        assert!(r.norm() < 1e-6);
        rows.push(model.coefficients().clone());
    }
    assert_eq!(rows.len(), 20);

    // Continuity: the constrained velocity modes stay at zero.
    for y in &rows {
        for m in 2..7 {
            assert!(y[m].abs() < 1e-8, "mode {m} = {}", y[m]);
        }
    }
}

#[test]
fn linear_operators_converge_in_one_iteration() {
    let ops = linear_ops();
    let nu = 0.02;
    let mut model = SteadyNsModel::new(&ops, nu).unwrap();
    model.set_velocity(inlet()).unwrap();
    let result = model.solve_online(&config()).unwrap();
    assert_eq!(result.iterations, 1);

    // Saddle system assembled straight from the operator blocks:
    // [nu B  K] [y_u]   [(nu BC1 + BC2) u_bc]
    // [P     0] [y_p] = [0                  ]
    let (n_u, n_p) = (ops.n_u(), ops.n_p());
    let mut saddle = DMatrix::zeros(n_u + n_p, n_u + n_p);
    saddle.view_mut((0, 0), (n_u, n_u)).copy_from(&(ops.b() * nu));
    saddle.view_mut((0, n_u), (n_u, n_p)).copy_from(ops.k());
    saddle.view_mut((n_u, 0), (n_p, n_u)).copy_from(ops.p());
    let mut rhs = DVector::zeros(n_u + n_p);
    let forcing = (ops.bc1() * nu + ops.bc2()) * inlet();
    rhs.rows_mut(0, n_u).copy_from(&forcing);
    let direct = saddle.lu().solve(&rhs).unwrap();
    assert!((&result.y - &direct).amax() < 1e-10);
}

#[test]
fn repeated_solve_is_idempotent() {
    let ops = scenario_ops();
    let mut model = SteadyNsModel::new(&ops, 0.03).unwrap();
    model.set_velocity(inlet()).unwrap();
    let first = model.solve_online(&config()).unwrap();
    let second = model.solve_online(&config()).unwrap();
    assert_eq!(first.y, second.y);
    assert_eq!(first.iterations, second.iterations);
}

#[test]
fn warm_start_reuses_previous_solution() {
    let ops = scenario_ops();
    let mut model = SteadyNsModel::new(&ops, 0.03)
        .unwrap()
        .with_initial_guess(InitialGuess::WarmStart);
    model.set_velocity(inlet()).unwrap();
    model.solve_online(&config()).unwrap();
    let again = model.solve_online(&config()).unwrap();
    assert_eq!(again.iterations, 0);
}

#[test]
fn zero_iteration_cap_reports_initial_guess() {
    let ops = scenario_ops();
    let mut model = SteadyNsModel::new(&ops, 0.03).unwrap();
    model.set_velocity(inlet()).unwrap();
    let err = model
        .solve_online(&config().with_max_iterations(0))
        .unwrap_err();
    match err {
        SolverError::NonConvergence {
            iterations, best, ..
        } => {
            assert_eq!(iterations, 0);
            assert_eq!(best, DVector::zeros(15));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!model.state().converged());
}

#[test]
fn all_zero_operators_give_singular_jacobian() {
    let ops = zero_ops_with_forcing();
    let mut model = SteadyNsModel::new(&ops, 0.01).unwrap();
    model.set_velocity(inlet()).unwrap();
    let err = model.solve_online(&config()).unwrap_err();
    assert!(matches!(err, SolverError::SingularJacobian { iteration: 1 }));
    assert!(err.is_point_local());
}

#[test]
fn patched_rows_reproduce_inlet_coefficients() {
    let ops = scenario_ops();
    let mut model = SteadyNsModel::new(&ops, 0.01)
        .unwrap()
        .with_boundary(BoundaryTreatment::Patched)
        .unwrap();
    model.set_velocity(inlet()).unwrap();
    let result = model.solve_online(&config()).unwrap();
    assert!((result.y[0] - 1.0).abs() < 1e-10);
    assert!(result.y[1].abs() < 1e-10);
}

#[test]
fn penalty_pulls_inlet_coefficients_towards_data() {
    let ops = with_penalty(scenario_ops());
    let mut model = SteadyNsModel::new(&ops, 0.01)
        .unwrap()
        .with_boundary(BoundaryTreatment::Penalty { tau: 10.0 })
        .unwrap();
    model.set_velocity(inlet()).unwrap();
    let result = model.solve_online(&config()).unwrap();
    assert!((result.y[0] - 1.0).abs() < 0.01);
    assert!(result.y[1].abs() < 0.01);
}

#[test]
fn penalty_without_operators_is_rejected() {
    let ops = scenario_ops();
    let err = SteadyNsModel::new(&ops, 0.01)
        .unwrap()
        .with_boundary(BoundaryTreatment::Penalty { tau: 10.0 })
        .unwrap_err();
    assert!(matches!(err, SolverError::MissingOperator { .. }));
}

#[test]
fn stokes_and_navier_stokes_differ_only_by_convection() {
    let ops = scenario_ops();
    let mut stokes = ReducedProblem::new(PhysicsKind::SteadyStokes, &ops, 0.01).unwrap();
    let mut ns = ReducedProblem::new(PhysicsKind::SteadyNs, &ops, 0.01).unwrap();
    stokes.set_velocity(inlet()).unwrap();
    ns.set_velocity(inlet()).unwrap();

    let s = stokes.solve_online(&config()).unwrap();
    let n = ns.solve_online(&config()).unwrap();
    assert_eq!(s.iterations, 1);
    assert!((&s.y - &n.y).amax() > 1e-6);

    let linear = linear_ops();
    let mut ns_linear = ReducedProblem::new(PhysicsKind::SteadyNs, &linear, 0.01).unwrap();
    ns_linear.set_velocity(inlet()).unwrap();
    let l = ns_linear.solve_online(&config()).unwrap();
    assert!((&s.y - &l.y).amax() < 1e-10);
}
