//! Evolvable genome: a fixed-topology feed-forward network plus the
//! sensor geometry (per-ray angle offsets and range) it controls.

use crate::config::{Activation, GenomeConfig};
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// A dense layer: weights are stored `(inputs, outputs)` so a forward pass
/// is a plain vector-matrix product.
#[derive(Clone, Debug, PartialEq)]
pub struct Dense {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl Dense {
    fn random<R: Rng>(inputs: usize, outputs: usize, w_std: f32, b_std: f32, rng: &mut R) -> Self {
        let weights = Array2::from_shape_fn((inputs, outputs), |_| {
            let z: f32 = rng.sample(StandardNormal);
            z * w_std
        });
        let biases = Array1::from_shape_fn(outputs, |_| {
            let z: f32 = rng.sample(StandardNormal);
            z * b_std
        });
        Self { weights, biases }
    }

    fn perturb<R: Rng>(&mut self, sigma: f32, rng: &mut R) {
        self.weights.mapv_inplace(|w| {
            let z: f32 = rng.sample(StandardNormal);
            w + z * sigma
        });
        self.biases.mapv_inplace(|b| {
            let z: f32 = rng.sample(StandardNormal);
            b + z * sigma
        });
    }

    fn is_finite(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite()) && self.biases.iter().all(|b| b.is_finite())
    }
}

impl Serialize for Dense {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let shape = self.weights.shape();
        let weights_data: Vec<f32> = self.weights.iter().copied().collect();
        let biases_data: Vec<f32> = self.biases.iter().copied().collect();

        let mut state = serializer.serialize_struct("Dense", 3)?;
        state.serialize_field("shape", &[shape[0], shape[1]])?;
        state.serialize_field("weights", &weights_data)?;
        state.serialize_field("biases", &biases_data)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Dense {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct DenseData {
            shape: [usize; 2],
            weights: Vec<f32>,
            biases: Vec<f32>,
        }

        let data = DenseData::deserialize(deserializer)?;
        let weights = Array2::from_shape_vec((data.shape[0], data.shape[1]), data.weights)
            .map_err(serde::de::Error::custom)?;
        let biases = Array1::from_vec(data.biases);

        Ok(Dense { weights, biases })
    }
}

/// The evolvable parameter set defining one agent's behavior policy.
///
/// Immutable once assigned to a born agent; `clone` and `mutate` hand out
/// fresh instances instead of editing in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub sensor_angles: Vec<f32>,
    pub sensor_range: f32,
    pub hidden: Dense,
    pub output: Dense,
}

/// Flat textual exchange format. This is the only representation of evolved
/// behavior that leaves the process, so the field set stays stable for a
/// given topology.
#[derive(Serialize, Deserialize)]
struct GenomeData {
    sensor_angles: Vec<f32>,
    sensor_range: f32,
    hidden_weights: Vec<f32>,
    hidden_biases: Vec<f32>,
    output_weights: Vec<f32>,
    output_biases: Vec<f32>,
}

/// Failures when importing a serialized genome.
#[derive(Debug)]
pub enum GenomeError {
    Parse(serde_json::Error),
    Dimensions { field: &'static str, expected: usize, found: usize },
}

impl std::fmt::Display for GenomeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "genome parse error: {}", e),
            Self::Dimensions { field, expected, found } => {
                write!(f, "genome {} length mismatch: expected {}, found {}", field, expected, found)
            }
        }
    }
}

impl std::error::Error for GenomeError {}

impl From<serde_json::Error> for GenomeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl Genome {
    /// Create a random genome: rays fanned symmetrically around the
    /// heading with jitter, range uniform within the configured band,
    /// weights Gaussian.
    pub fn random<R: Rng>(cfg: &GenomeConfig, rng: &mut R) -> Self {
        let half = cfg.sensor_count as f32 / 2.0 - 0.5;
        let sensor_angles = (0..cfg.sensor_count)
            .map(|i| {
                (i as f32 - half) * cfg.sensor_angle_base
                    + rng.gen_range(-cfg.sensor_angle_variation..=cfg.sensor_angle_variation)
            })
            .collect();
        let sensor_range = rng.gen_range(cfg.sensor_range_min..=cfg.sensor_range_max);

        Self {
            sensor_angles,
            sensor_range,
            hidden: Dense::random(cfg.inputs(), cfg.hidden, cfg.weight_init_std, cfg.bias_init_std, rng),
            output: Dense::random(cfg.hidden, cfg.outputs, cfg.weight_init_std, cfg.bias_init_std, rng),
        }
    }

    #[inline]
    pub fn n_inputs(&self) -> usize {
        self.hidden.weights.nrows()
    }

    #[inline]
    pub fn n_hidden(&self) -> usize {
        self.hidden.weights.ncols()
    }

    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.output.weights.ncols()
    }

    /// One forward pass. Hidden units are tanh; each output applies the
    /// configured activation for its index.
    pub fn feed(&self, inputs: &[f32], activations: &[Activation]) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), self.n_inputs());

        let x = ArrayView1::from(inputs);
        let mut hidden = x.dot(&self.hidden.weights) + &self.hidden.biases;
        hidden.mapv_inplace(|v| v.tanh());

        let mut out = hidden.dot(&self.output.weights) + &self.output.biases;
        for (o, v) in out.iter_mut().enumerate() {
            *v = match activations.get(o).copied().unwrap_or(Activation::Sigmoid) {
                Activation::Sigmoid => 1.0 / (1.0 + (-*v).exp()),
                Activation::Tanh => v.tanh(),
            };
        }
        out.to_vec()
    }

    /// Return a mutated copy: independent additive Gaussian noise on every
    /// weight and bias, with the sensor geometry perturbed on its own
    /// scales and the range re-floored.
    pub fn mutate<R: Rng>(&self, cfg: &GenomeConfig, rng: &mut R, sigma: f32) -> Self {
        let mut g = self.clone();
        for a in &mut g.sensor_angles {
            let z: f32 = rng.sample(StandardNormal);
            *a += z * sigma * cfg.angle_noise_factor;
        }
        let z: f32 = rng.sample(StandardNormal);
        g.sensor_range += z * sigma * cfg.range_noise_factor;
        g.sensor_range = g.sensor_range.max(cfg.min_sensor_range);

        g.hidden.perturb(sigma, rng);
        g.output.perturb(sigma, rng);
        g
    }

    /// Add N(0, sigma) noise to the connection weights only, leaving
    /// biases and sensor geometry alone. Used on freshly recombined and
    /// momentum-extrapolated children.
    pub(crate) fn perturb_weights<R: Rng>(&mut self, sigma: f32, rng: &mut R) {
        self.hidden.weights.mapv_inplace(|w| {
            let z: f32 = rng.sample(StandardNormal);
            w + z * sigma
        });
        self.output.weights.mapv_inplace(|w| {
            let z: f32 = rng.sample(StandardNormal);
            w + z * sigma
        });
    }

    /// All parameters flattened in a fixed order (angles, range, hidden
    /// weights row-major, hidden biases, output weights, output biases).
    pub fn parameter_vector(&self) -> Vec<f32> {
        let mut params = Vec::with_capacity(self.parameter_count());
        params.extend_from_slice(&self.sensor_angles);
        params.push(self.sensor_range);
        params.extend(self.hidden.weights.iter().copied());
        params.extend(self.hidden.biases.iter().copied());
        params.extend(self.output.weights.iter().copied());
        params.extend(self.output.biases.iter().copied());
        params
    }

    /// Rebuild a genome from a flattened parameter vector; inverse of
    /// [`Genome::parameter_vector`].
    pub fn from_parameter_vector(cfg: &GenomeConfig, params: &[f32]) -> Result<Self, GenomeError> {
        let inputs = cfg.inputs();
        let expected =
            cfg.sensor_count + 1 + inputs * cfg.hidden + cfg.hidden + cfg.hidden * cfg.outputs + cfg.outputs;
        if params.len() != expected {
            return Err(GenomeError::Dimensions {
                field: "parameters",
                expected,
                found: params.len(),
            });
        }

        let mut at = 0usize;
        let mut take = |n: usize| {
            let slice = &params[at..at + n];
            at += n;
            slice.to_vec()
        };

        let sensor_angles = take(cfg.sensor_count);
        let sensor_range = take(1)[0].max(cfg.min_sensor_range);
        let hidden_weights = take(inputs * cfg.hidden);
        let hidden_biases = take(cfg.hidden);
        let output_weights = take(cfg.hidden * cfg.outputs);
        let output_biases = take(cfg.outputs);

        Ok(Self {
            sensor_angles,
            sensor_range,
            hidden: Dense {
                weights: Array2::from_shape_vec((inputs, cfg.hidden), hidden_weights)
                    .map_err(|_| GenomeError::Dimensions {
                        field: "hidden_weights",
                        expected: inputs * cfg.hidden,
                        found: 0,
                    })?,
                biases: Array1::from_vec(hidden_biases),
            },
            output: Dense {
                weights: Array2::from_shape_vec((cfg.hidden, cfg.outputs), output_weights)
                    .map_err(|_| GenomeError::Dimensions {
                        field: "output_weights",
                        expected: cfg.hidden * cfg.outputs,
                        found: 0,
                    })?,
                biases: Array1::from_vec(output_biases),
            },
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.sensor_angles.len()
            + 1
            + self.hidden.weights.len()
            + self.hidden.biases.len()
            + self.output.weights.len()
            + self.output.biases.len()
    }

    /// NaN/Inf screen, run after deserialization and in debug assertions.
    pub fn is_valid(&self) -> bool {
        self.sensor_angles.iter().all(|a| a.is_finite())
            && self.sensor_range.is_finite()
            && self.hidden.is_finite()
            && self.output.is_finite()
    }

    /// Export to the flat textual form.
    pub fn to_json(&self) -> Result<String, GenomeError> {
        let data = GenomeData {
            sensor_angles: self.sensor_angles.clone(),
            sensor_range: self.sensor_range,
            hidden_weights: self.hidden.weights.iter().copied().collect(),
            hidden_biases: self.hidden.biases.iter().copied().collect(),
            output_weights: self.output.weights.iter().copied().collect(),
            output_biases: self.output.biases.iter().copied().collect(),
        };
        Ok(serde_json::to_string(&data)?)
    }

    /// Import from the flat textual form, validating every array length
    /// against the configured topology. On any failure the error is
    /// returned and no genome is produced.
    pub fn from_json(json: &str, cfg: &GenomeConfig) -> Result<Self, GenomeError> {
        let data: GenomeData = serde_json::from_str(json)?;
        let inputs = cfg.inputs();

        let check = |field: &'static str, expected: usize, found: usize| {
            if expected == found {
                Ok(())
            } else {
                Err(GenomeError::Dimensions { field, expected, found })
            }
        };
        check("sensor_angles", cfg.sensor_count, data.sensor_angles.len())?;
        check("hidden_weights", inputs * cfg.hidden, data.hidden_weights.len())?;
        check("hidden_biases", cfg.hidden, data.hidden_biases.len())?;
        check("output_weights", cfg.hidden * cfg.outputs, data.output_weights.len())?;
        check("output_biases", cfg.outputs, data.output_biases.len())?;

        Ok(Self {
            sensor_angles: data.sensor_angles,
            sensor_range: data.sensor_range.max(cfg.min_sensor_range),
            hidden: Dense {
                weights: Array2::from_shape_vec((inputs, cfg.hidden), data.hidden_weights)
                    .map_err(|_| GenomeError::Dimensions {
                        field: "hidden_weights",
                        expected: inputs * cfg.hidden,
                        found: 0,
                    })?,
                biases: Array1::from_vec(data.hidden_biases),
            },
            output: Dense {
                weights: Array2::from_shape_vec((cfg.hidden, cfg.outputs), data.output_weights)
                    .map_err(|_| GenomeError::Dimensions {
                        field: "output_weights",
                        expected: cfg.hidden * cfg.outputs,
                        found: 0,
                    })?,
                biases: Array1::from_vec(data.output_biases),
            },
        })
    }
}
