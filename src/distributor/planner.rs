//! Decides, for a given object size, how many parts to cut it into, how big
//! each part is, and which part-server indices hold each part.
use rand::Rng;

use objectstore_util::error::Error;

/// The output of [`Planner::plan`]: a part count (`servers.len()`), a
/// per-part size, and the server index chosen for each part. `servers[i]`
/// holds part `i`. An empty plan (`servers` empty) means "store nothing".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
	pub part_size: i64,
	pub servers: Vec<usize>,
}

impl Plan {
	fn empty() -> Self {
		Plan { part_size: 0, servers: Vec::new() }
	}

	pub fn is_empty(&self) -> bool {
		self.servers.is_empty()
	}

	pub fn parts(&self) -> usize {
		self.servers.len()
	}
}

#[derive(Debug)]
pub struct Planner {
	max_parts: usize,
	min_part_size: i64,
	weights: Vec<u32>,
}

impl Planner {
	/// Rejects configurations that the weighted-sampling algorithm could not
	/// satisfy: a non-positive `max_parts`/`min_part_size`, a weight vector
	/// that doesn't sum to something positive, or a `max_parts` greater than
	/// the number of servers with positive weight (each of a plan's picks
	/// must land on a still-available server).
	pub fn new(max_parts: usize, min_part_size: i64, weights: Vec<u32>) -> Result<Self, Error> {
		if max_parts == 0 {
			return Err(Error::bad_request("max_parts must be at least 1"));
		}
		if min_part_size <= 0 {
			return Err(Error::bad_request("min_part_size must be at least 1"));
		}
		if weights.is_empty() {
			return Err(Error::bad_request("no weights provided"));
		}
		let positive_weights = weights.iter().filter(|&&w| w > 0).count();
		if positive_weights == 0 {
			return Err(Error::bad_request("weight vector must sum to a positive value"));
		}
		if max_parts > positive_weights {
			return Err(Error::bad_request(format!(
				"max_parts ({max_parts}) exceeds the number of servers with positive weight ({positive_weights})"
			)));
		}

		Ok(Self { max_parts, min_part_size, weights })
	}

	/// `file_size <= 0` yields the empty plan. Otherwise splits `file_size`
	/// into `max_parts` parts when they would each be at least
	/// `min_part_size`, else into just enough `min_part_size` parts.
	pub fn plan(&self, file_size: i64) -> Plan {
		if file_size <= 0 {
			return Plan::empty();
		}

		let ideal = file_size / self.max_parts as i64;
		let (part_size, parts) = if ideal >= self.min_part_size {
			(ideal, self.max_parts)
		} else {
			let parts = ((file_size + self.min_part_size - 1) / self.min_part_size) as usize;
			(self.min_part_size, parts)
		};

		let servers = select_servers(&self.weights, parts);
		debug!(file_size, part_size, parts, "planned upload");
		Plan { part_size, servers }
	}
}

/// Weighted sampling without replacement: draws `n` distinct indices from
/// `weights`, each pick favoring larger residual weights. Construction-time
/// validation in [`Planner::new`] guarantees `n` never exceeds the number of
/// positive weights, so every draw below has a strictly positive residual
/// total to sample from.
fn select_servers(weights: &[u32], n: usize) -> Vec<usize> {
	let mut residual: Vec<u32> = weights.to_vec();
	let mut total: u64 = residual.iter().map(|&w| w as u64).sum();

	let mut selected = Vec::with_capacity(n);
	let mut rng = rand::thread_rng();

	for _ in 0..n {
		let r = rng.gen_range(1..=total);

		let mut cumulative: u64 = 0;
		let mut picked = None;
		for (index, &weight) in residual.iter().enumerate() {
			cumulative += weight as u64;
			if r <= cumulative {
				picked = Some(index);
				break;
			}
		}
		let picked = picked.expect("weighted draw must land on a residual weight");

		total -= residual[picked] as u64;
		residual[picked] = 0;
		selected.push(picked);
	}

	selected
}
