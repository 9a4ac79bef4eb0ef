use nalgebra::DMatrix;

const UNASSIGNED: usize = usize::MAX;

/// What an assignment adds to the running match count and score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AssignmentOutcome {
    /// Rows assigned to a cell holding a real edge (any non-zero score).
    pub matches: usize,
    /// Sum of the assigned cell scores.
    pub score: f32,
}

/// Solves the rectangular maximum-weight assignment on a score matrix.
///
/// Every row is assigned to a distinct column. Cells holding exactly `0.0` mean
/// "no edge": a row may still land on one (and then contributes nothing), but when
/// it could move to a free column holding a real edge instead, it does. A real
/// edge whose score is zero must be stored as a tiny positive value to stay
/// distinguishable.
///
/// Internally the problem is turned into a minimization of `max - score` per cell
/// and handed to [`linear_sum_assignment`]. A matrix with more rows than columns
/// is transposed first.
///
/// Returns `None` if the matrix holds a non-finite value.
///
/// # Arguments
///
/// * `scores` - non-negative pair scores, `0.0` where there is no edge.
/// * `max` - the largest value in `scores`.
pub fn maximum_weight_assignment(scores: &DMatrix<f32>, max: f32) -> Option<AssignmentOutcome> {
    if scores.nrows() > scores.ncols() {
        return maximum_weight_assignment(&scores.transpose(), max);
    }

    if scores.nrows() == 0 {
        return Some(AssignmentOutcome::default());
    }

    let max = f64::from(max);
    let cost = scores.map(|s| max - f64::from(s));

    let mut col_for_row = linear_sum_assignment(&cost)?;
    prefer_real_edges(scores, &mut col_for_row);

    let mut outcome = AssignmentOutcome::default();
    for (row, &col) in col_for_row.iter().enumerate() {
        let s = scores[(row, col)];
        if s != 0.0 {
            outcome.matches += 1;
            outcome.score += s;
        }
    }

    Some(outcome)
}

/// Minimum-cost rectangular assignment (shortest augmenting path, Jonker-Volgenant style).
///
/// Requires `rows <= cols`; every row receives a distinct column. Runs in
/// `O(rows^2 * cols)`.
///
/// Returns the column chosen for each row, or `None` if `rows > cols` or a cost is
/// not finite.
///
/// # Example
///
/// ```rust
/// # use mscosine::similarity::assignment::linear_sum_assignment;
/// # use nalgebra::DMatrix;
/// let cost = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 3.0, 2.0, 0.0, 5.0, 3.0, 2.0, 2.0]);
/// assert_eq!(linear_sum_assignment(&cost), Some(vec![1, 0, 2]));
/// ```
pub fn linear_sum_assignment(cost: &DMatrix<f64>) -> Option<Vec<usize>> {
    let (rows, cols) = cost.shape();

    if rows > cols || cost.iter().any(|c| !c.is_finite()) {
        return None;
    }

    AugmentingPathSolver::new(cost).solve()
}

/// Scratch state of one solve; dropped with the solver on every exit path.
struct AugmentingPathSolver<'a> {
    cost: &'a DMatrix<f64>,
    u: Vec<f64>,
    v: Vec<f64>,
    shortest_path_costs: Vec<f64>,
    path: Vec<usize>,
    col4row: Vec<usize>,
    row4col: Vec<usize>,
    visited_rows: Vec<bool>,
    visited_cols: Vec<bool>,
    remaining: Vec<usize>,
}

impl<'a> AugmentingPathSolver<'a> {
    fn new(cost: &'a DMatrix<f64>) -> Self {
        let (rows, cols) = cost.shape();

        AugmentingPathSolver {
            cost,
            u: vec![0.0; rows],
            v: vec![0.0; cols],
            shortest_path_costs: vec![f64::INFINITY; cols],
            path: vec![UNASSIGNED; cols],
            col4row: vec![UNASSIGNED; rows],
            row4col: vec![UNASSIGNED; cols],
            visited_rows: vec![false; rows],
            visited_cols: vec![false; cols],
            remaining: vec![0; cols],
        }
    }

    fn solve(mut self) -> Option<Vec<usize>> {
        let (rows, cols) = self.cost.shape();

        for cur_row in 0..rows {
            let (sink, min_val) = self.augmenting_path(cur_row)?;

            // update dual variables
            self.u[cur_row] += min_val;
            for i in 0..rows {
                if self.visited_rows[i] && i != cur_row {
                    self.u[i] += min_val - self.shortest_path_costs[self.col4row[i]];
                }
            }
            for j in 0..cols {
                if self.visited_cols[j] {
                    self.v[j] -= min_val - self.shortest_path_costs[j];
                }
            }

            // flip the alternating path ending in sink
            let mut j = sink;
            loop {
                let i = self.path[j];
                self.row4col[j] = i;
                std::mem::swap(&mut self.col4row[i], &mut j);
                if i == cur_row {
                    break;
                }
            }
        }

        Some(self.col4row)
    }

    /// Dijkstra over reduced costs from `cur_row` to the nearest free column.
    fn augmenting_path(&mut self, cur_row: usize) -> Option<(usize, f64)> {
        let cols = self.v.len();
        let mut min_val = 0.0;
        let mut num_remaining = cols;

        // filled in reverse so ties prefer low column indices
        for (it, slot) in self.remaining.iter_mut().enumerate() {
            *slot = cols - it - 1;
        }
        self.visited_rows.fill(false);
        self.visited_cols.fill(false);
        self.shortest_path_costs.fill(f64::INFINITY);

        let mut i = cur_row;
        loop {
            let mut index = None;
            let mut lowest = f64::INFINITY;
            self.visited_rows[i] = true;

            for it in 0..num_remaining {
                let j = self.remaining[it];
                let reduced = min_val + self.cost[(i, j)] - self.u[i] - self.v[j];

                if reduced < self.shortest_path_costs[j] {
                    self.path[j] = i;
                    self.shortest_path_costs[j] = reduced;
                }

                let candidate = self.shortest_path_costs[j];
                if candidate < lowest || (candidate == lowest && self.row4col[j] == UNASSIGNED) {
                    lowest = candidate;
                    index = Some(it);
                }
            }

            min_val = lowest;
            if !min_val.is_finite() {
                return None;
            }

            let it = index?;
            let j = self.remaining[it];
            self.visited_cols[j] = true;
            num_remaining -= 1;
            self.remaining[it] = self.remaining[num_remaining];

            if self.row4col[j] == UNASSIGNED {
                return Some((j, min_val));
            }
            i = self.row4col[j];
        }
    }
}

/// Moves rows that ended on a "no edge" cell to a free column with a positive edge.
///
/// Negative cells are left alone, moving onto one would lower the optimal total.
fn prefer_real_edges(scores: &DMatrix<f32>, col_for_row: &mut [usize]) {
    let mut taken = vec![false; scores.ncols()];
    for &col in col_for_row.iter() {
        taken[col] = true;
    }

    for row in 0..col_for_row.len() {
        if scores[(row, col_for_row[row])] != 0.0 {
            continue;
        }

        if let Some(col) = (0..scores.ncols()).find(|&j| !taken[j] && scores[(row, j)] > 0.0) {
            taken[col_for_row[row]] = false;
            taken[col] = true;
            col_for_row[row] = col;
        }
    }
}
