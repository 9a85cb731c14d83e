//! Strictly convex quadratic programs (Goldfarb–Idnani dual active set).
//!
//! Purpose
//! - Solve `min 0.5·xᵀGx + g0ᵀx` subject to `CEᵀx + ce0 = 0` and
//!   `CIᵀx + ci0 >= 0` for the feasibility and redundancy searches.
//!
//! Why this design
//! - The dual method starts from the unconstrained minimizer and adds violated
//!   constraints one at a time; no feasible starting point is needed.
//! - The active set is tracked through `J = L⁻ᵀ Q` and the upper-triangular
//!   `R`, updated with Givens rotations; `G` must be positive definite.
//! - A violated constraint that depends linearly on the active set only
//!   moves the multipliers (dual step) until an active constraint drops out.
//! - Violations at rounding level are ignored. Duplicated rows would
//!   otherwise trade places in the active set forever.
//!
//! References
//! - D. Goldfarb, A. Idnani, "A numerically stable dual method for solving
//!   strictly convex quadratic programs", Math. Programming 27 (1983).

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::cfg::QP_ITERS_PER_ROW;

/// Relative size of constraint violations treated as rounding noise.
const VIOLATION_EPS: f64 = 1e-12;
/// Relative size of the free component below which a constraint counts as
/// linearly dependent on the active set.
const DEPENDENCE_EPS: f64 = 1e-12;

/// Failure modes of [`solve`].
#[derive(Debug, Clone, PartialEq)]
pub enum QpError {
    /// Matrix/vector shapes disagree.
    DimensionMismatch,
    /// `G` is not (numerically) positive definite.
    NotPositiveDefinite,
    /// The equality constraints are linearly dependent or inconsistent.
    DependentEqualities,
    /// No point satisfies all constraints.
    Infeasible,
    /// The active-set iteration did not settle.
    IterationLimit,
    /// The solution contains NaN or infinite entries.
    NonFinite,
}

impl fmt::Display for QpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QpError::DimensionMismatch => write!(f, "QP inputs have inconsistent dimensions"),
            QpError::NotPositiveDefinite => write!(f, "QP matrix G is not positive definite"),
            QpError::DependentEqualities => {
                write!(f, "QP equality constraints are linearly dependent")
            }
            QpError::Infeasible => write!(f, "QP constraints are infeasible"),
            QpError::IterationLimit => write!(f, "QP active-set iteration limit reached"),
            QpError::NonFinite => write!(f, "QP solution is not finite"),
        }
    }
}

impl std::error::Error for QpError {}

/// Optimal point and objective value.
#[derive(Clone, Debug)]
pub struct QpSolution {
    pub x: DVector<f64>,
    pub value: f64,
}

/// Problem data. Constraint matrices hold one constraint per column.
#[derive(Clone, Debug)]
pub struct QpProblem<'a> {
    pub g: &'a DMatrix<f64>,
    pub g0: &'a DVector<f64>,
    pub ce: &'a DMatrix<f64>,
    pub ce0: &'a DVector<f64>,
    pub ci: &'a DMatrix<f64>,
    pub ci0: &'a DVector<f64>,
}

/// Factorization of the active set: `J` (n×n) and upper-triangular `R`.
struct Factor {
    j0: DMatrix<f64>,
    j: DMatrix<f64>,
    r: DMatrix<f64>,
    r_norm: f64,
    iq: usize,
}

impl Factor {
    fn new(j0: DMatrix<f64>) -> Self {
        let n = j0.nrows();
        Self {
            j: j0.clone(),
            j0,
            r: DMatrix::zeros(n, n),
            r_norm: 1.0,
            iq: 0,
        }
    }

    fn reset(&mut self) {
        self.j.copy_from(&self.j0);
        self.r.fill(0.0);
        self.r_norm = 1.0;
        self.iq = 0;
    }

    /// `d = Jᵀ np`.
    fn compute_d(&self, np: &DVector<f64>) -> DVector<f64> {
        self.j.tr_mul(np)
    }

    /// Primal step direction `z = J[:, iq..] d[iq..]`.
    fn step_direction(&self, d: &DVector<f64>) -> DVector<f64> {
        let n = self.j.nrows();
        let k = n - self.iq;
        self.j.columns(self.iq, k) * d.rows(self.iq, k)
    }

    /// Dual step direction `r = R[..iq, ..iq]⁻¹ d[..iq]` (back substitution).
    fn dual_direction(&self, d: &DVector<f64>) -> DVector<f64> {
        let iq = self.iq;
        let mut r = DVector::zeros(iq);
        for i in (0..iq).rev() {
            let mut sum = 0.0;
            for k in i + 1..iq {
                sum += self.r[(i, k)] * r[k];
            }
            r[i] = (d[i] - sum) / self.r[(i, i)];
        }
        r
    }

    /// Append a constraint whose `d = Jᵀ np` is given. Returns false when the
    /// constraint is linearly dependent on the active set.
    fn add(&mut self, d: &mut DVector<f64>) -> bool {
        let n = d.len();
        for jj in (self.iq + 1..n).rev() {
            let mut cc = d[jj - 1];
            let mut ss = d[jj];
            let h = cc.hypot(ss);
            if h == 0.0 {
                continue;
            }
            d[jj] = 0.0;
            ss /= h;
            cc /= h;
            if cc < 0.0 {
                cc = -cc;
                ss = -ss;
                d[jj - 1] = -h;
            } else {
                d[jj - 1] = h;
            }
            let xny = ss / (1.0 + cc);
            for k in 0..n {
                let t1 = self.j[(k, jj - 1)];
                let t2 = self.j[(k, jj)];
                self.j[(k, jj - 1)] = t1 * cc + t2 * ss;
                self.j[(k, jj)] = xny * (t1 + self.j[(k, jj - 1)]) - t2;
            }
        }
        self.iq += 1;
        for i in 0..self.iq {
            self.r[(i, self.iq - 1)] = d[i];
        }
        let diag = d[self.iq - 1].abs();
        if diag <= f64::EPSILON * self.r_norm {
            return false;
        }
        self.r_norm = self.r_norm.max(diag);
        true
    }

    /// Remove the active constraint at position `qq` and restore the
    /// triangular shape of `R`.
    fn delete(&mut self, qq: usize) {
        let n = self.j.nrows();
        for i in qq..self.iq - 1 {
            for k in 0..n {
                self.r[(k, i)] = self.r[(k, i + 1)];
            }
        }
        for k in 0..n {
            self.r[(k, self.iq - 1)] = 0.0;
        }
        self.iq -= 1;
        if self.iq == 0 {
            return;
        }
        for jj in qq..self.iq {
            let mut cc = self.r[(jj, jj)];
            let mut ss = self.r[(jj + 1, jj)];
            let h = cc.hypot(ss);
            if h == 0.0 {
                continue;
            }
            cc /= h;
            ss /= h;
            self.r[(jj + 1, jj)] = 0.0;
            if cc < 0.0 {
                self.r[(jj, jj)] = -h;
                cc = -cc;
                ss = -ss;
            } else {
                self.r[(jj, jj)] = h;
            }
            let xny = ss / (1.0 + cc);
            for k in jj + 1..self.iq {
                let t1 = self.r[(jj, k)];
                let t2 = self.r[(jj + 1, k)];
                self.r[(jj, k)] = t1 * cc + t2 * ss;
                self.r[(jj + 1, k)] = xny * (t1 + self.r[(jj, k)]) - t2;
            }
            for k in 0..n {
                let t1 = self.j[(k, jj)];
                let t2 = self.j[(k, jj + 1)];
                self.j[(k, jj)] = t1 * cc + t2 * ss;
                self.j[(k, jj + 1)] = xny * (self.j[(k, jj)] + t1) - t2;
            }
        }
    }
}

/// Solve the QP. See the module docs for the problem form.
pub fn solve(qp: &QpProblem<'_>) -> Result<QpSolution, QpError> {
    let n = qp.g.nrows();
    let p = qp.ce.ncols();
    let m = qp.ci.ncols();
    if qp.g.ncols() != n
        || qp.g0.len() != n
        || (p > 0 && qp.ce.nrows() != n)
        || qp.ce0.len() != p
        || (m > 0 && qp.ci.nrows() != n)
        || qp.ci0.len() != m
    {
        return Err(QpError::DimensionMismatch);
    }

    let chol = qp.g.clone().cholesky().ok_or(QpError::NotPositiveDefinite)?;
    let l_inv = chol
        .l()
        .solve_lower_triangular(&DMatrix::identity(n, n))
        .ok_or(QpError::NotPositiveDefinite)?;
    let j0 = l_inv.transpose();
    let mut factor = Factor::new(j0);

    // Unconstrained minimizer.
    let mut x = chol.solve(&(-qp.g0));
    // Multipliers of the active constraints, equalities first.
    let mut u: Vec<f64> = Vec::with_capacity(n);

    for i in 0..p {
        let np = qp.ce.column(i).into_owned();
        let mut d = factor.compute_d(&np);
        let z = factor.step_direction(&d);
        let r = factor.dual_direction(&d);
        let mut t2 = 0.0;
        if z.norm_squared() > f64::EPSILON {
            t2 = (-np.dot(&x) - qp.ce0[i]) / z.dot(&np);
        }
        x += &z * t2;
        for (k, uk) in u.iter_mut().enumerate() {
            *uk -= t2 * r[k];
        }
        u.push(t2);
        if !factor.add(&mut d) {
            return Err(QpError::DependentEqualities);
        }
    }

    let ci_col = |i: usize| qp.ci.column(i).into_owned();
    let slack = |i: usize, x: &DVector<f64>| qp.ci.column(i).dot(x) + qp.ci0[i];
    let ci_norms: Vec<f64> = (0..m).map(|i| qp.ci.column(i).norm()).collect();
    // Violations below this are rounding noise on tight rows, such as twins
    // of an active row.
    let noise = |i: usize, x: &DVector<f64>| {
        VIOLATION_EPS * (1.0 + qp.ci0[i].abs() + ci_norms[i] * x.norm())
    };

    let mut active: Vec<usize> = Vec::new();
    let mut available = vec![true; m];
    // Constraints found dependent on the active set; cleared after the next
    // successful addition.
    let mut excluded = vec![false; m];
    let mut s = DVector::zeros(m);
    let max_iters = QP_ITERS_PER_ROW * (n + m + p) + 100;
    let mut iters = 0usize;

    'step1: loop {
        iters += 1;
        if iters > max_iters {
            return Err(QpError::IterationLimit);
        }
        for &a in &active {
            available[a] = false;
        }
        for i in 0..m {
            s[i] = slack(i, &x);
        }
        let x_old = x.clone();
        let u_old = u.clone();
        let active_old = active.clone();

        'pick: loop {
            let mut ss = 0.0;
            let mut pick = None;
            for i in 0..m {
                if available[i] && !excluded[i] && s[i] < ss && s[i] < -noise(i, &x) {
                    ss = s[i];
                    pick = Some(i);
                }
            }
            let Some(ip) = pick else {
                break 'step1;
            };
            let np = ci_col(ip);
            let mut u_add = 0.0;

            loop {
                iters += 1;
                if iters > max_iters {
                    return Err(QpError::IterationLimit);
                }
                let mut d = factor.compute_d(&np);
                let free = d.rows(factor.iq, n - factor.iq).norm();
                // Same test `Factor::add` applies after the rotations, with
                // some margin so a full step is never followed by a failed add.
                let dependent = free <= DEPENDENCE_EPS * factor.r_norm;
                let z = factor.step_direction(&d);
                let r = factor.dual_direction(&d);

                // Largest dual step keeping active multipliers non-negative.
                let mut t1 = f64::INFINITY;
                let mut drop_pos = None;
                for k in p..factor.iq {
                    if r[k] > 0.0 && u[k] / r[k] < t1 {
                        t1 = u[k] / r[k];
                        drop_pos = Some(k);
                    }
                }
                // Full primal step that makes constraint `ip` tight.
                let mut t2 = f64::INFINITY;
                if !dependent {
                    let curvature = z.dot(&np);
                    if curvature > 0.0 {
                        t2 = -s[ip] / curvature;
                        if t2 < 0.0 {
                            t2 = f64::INFINITY;
                        }
                    }
                }
                let t = t1.min(t2);
                if !t.is_finite() {
                    return Err(QpError::Infeasible);
                }

                if !t2.is_finite() {
                    // Dual step only.
                    for (k, uk) in u.iter_mut().enumerate() {
                        *uk -= t * r[k];
                    }
                    u_add += t;
                    if let Some(pos) = drop_pos {
                        let l = active[pos - p];
                        available[l] = true;
                        active.remove(pos - p);
                        u.remove(pos);
                        factor.delete(pos);
                    }
                    continue;
                }

                x += &z * t;
                for (k, uk) in u.iter_mut().enumerate() {
                    *uk -= t * r[k];
                }
                u_add += t;

                if t2 <= t1 {
                    if factor.add(&mut d) {
                        active.push(ip);
                        u.push(u_add);
                        available[ip] = false;
                        excluded.iter_mut().for_each(|e| *e = false);
                        continue 'step1;
                    }
                    // Dependent after all: exclude it until the active set
                    // changes, and restore the last consistent state.
                    excluded[ip] = true;
                    x = x_old.clone();
                    u = u_old.clone();
                    active = active_old.clone();
                    available.iter_mut().for_each(|a| *a = true);
                    for &a in &active {
                        available[a] = false;
                    }
                    rebuild(&mut factor, qp.ce, &active, qp.ci);
                    continue 'pick;
                }

                // Partial step: drop the blocking constraint and retry.
                if let Some(pos) = drop_pos {
                    let l = active[pos - p];
                    available[l] = true;
                    active.remove(pos - p);
                    u.remove(pos);
                    factor.delete(pos);
                }
                s[ip] = slack(ip, &x);
            }
        }
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(QpError::NonFinite);
    }
    let value = 0.5 * x.dot(&(qp.g * &x)) + qp.g0.dot(&x);
    Ok(QpSolution { x, value })
}

/// Refactor `J`/`R` from scratch for the equalities followed by `active`.
fn rebuild(factor: &mut Factor, ce: &DMatrix<f64>, active: &[usize], ci: &DMatrix<f64>) {
    factor.reset();
    let eqs = (0..ce.ncols()).map(|i| ce.column(i).into_owned());
    let ineqs = active.iter().map(|&i| ci.column(i).into_owned());
    for np in eqs.chain(ineqs) {
        let mut d = factor.compute_d(&np);
        factor.add(&mut d);
    }
}

/// Convenience wrapper for problems with inequality constraints only.
pub fn solve_inequality(
    g: &DMatrix<f64>,
    g0: &DVector<f64>,
    ci: &DMatrix<f64>,
    ci0: &DVector<f64>,
) -> Result<QpSolution, QpError> {
    let n = g.nrows();
    let ce = DMatrix::zeros(n, 0);
    let ce0 = DVector::zeros(0);
    solve(&QpProblem {
        g,
        g0,
        ce: &ce,
        ce0: &ce0,
        ci,
        ci0,
    })
}
