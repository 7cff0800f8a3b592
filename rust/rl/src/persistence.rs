use crate::error::{Error, Result};
use crate::mdps::{discretizer::StateDiscretizer, mdp::MdpModel};
use flappy::Continous;
use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;
use tracing::warn;

/// On-disk form of a learned model. Arrays are stored as plain nested lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub version: u32,
    pub saved_at: String,
    pub episodes: usize,
    pub num_states: usize,
    pub include_y: bool,
    /// `[y_s, dx_s, dy_s]`
    pub state_discretization: Vec<Vec<Continous>>,
    pub transition_counts: Vec<Vec<Vec<u64>>>,
    pub transition_probs: Vec<Vec<Vec<Continous>>>,
    pub reward_counts: Vec<[Continous; 2]>,
    pub reward: Vec<Continous>,
    pub value: Vec<Continous>,
}

impl SavedModel {
    pub const VERSION: u32 = 1;

    pub fn new(discretizer: &StateDiscretizer, mdp: &MdpModel, episodes: usize) -> Self {
        Self {
            version: Self::VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            episodes,
            num_states: mdp.n_s(),
            include_y: discretizer.include_y(),
            state_discretization: discretizer.grids().iter().map(|g| g.to_vec()).collect(),
            transition_counts: nested3(mdp.transition_counts()),
            transition_probs: nested3(mdp.transition_probs()),
            reward_counts: mdp
                .reward_counts()
                .rows()
                .into_iter()
                .map(|r| [r[0], r[1]])
                .collect(),
            reward: mdp.reward().to_vec(),
            value: mdp.value().to_vec(),
        }
    }

    /// Rebuild the discretizer and model, checking every shape on the way.
    pub fn into_parts(self) -> Result<(StateDiscretizer, MdpModel)> {
        if self.version != Self::VERSION {
            return Err(shape_error("version", Self::VERSION, self.version));
        }
        let [y_s, dx_s, dy_s]: [Vec<Continous>; 3] = self
            .state_discretization
            .try_into()
            .map_err(|g: Vec<Vec<Continous>>| shape_error("state_discretization", 3, g.len()))?;
        let discretizer = StateDiscretizer::new(
            Array1::from(y_s),
            Array1::from(dx_s),
            Array1::from(dy_s),
            self.include_y,
        )?;

        let n_s = self.num_states;
        if discretizer.n_s() != n_s {
            return Err(shape_error("num_states", discretizer.n_s(), n_s));
        }

        let reward_counts =
            Array2::from_shape_fn((self.reward_counts.len(), 2), |(s, i)| self.reward_counts[s][i]);

        let mdp = MdpModel::from_parts(
            array3("transition_counts", self.transition_counts, n_s)?,
            array3("transition_probs", self.transition_probs, n_s)?,
            reward_counts,
            Array1::from(self.reward),
            Array1::from(self.value),
        )?;

        Ok((discretizer, mdp))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: "create model file".to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer(BufWriter::new(file), self)?;

        Ok(())
    }

    /// `Ok(None)` when there is nothing saved at `path` yet.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "no saved model, starting fresh");
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: "open model file".to_string(),
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }
}

fn nested3<T: Copy>(a: &Array3<T>) -> Vec<Vec<Vec<T>>> {
    a.outer_iter()
        .map(|m| m.outer_iter().map(|r| r.to_vec()).collect())
        .collect()
}

fn array3<T: Copy>(field: &str, v: Vec<Vec<Vec<T>>>, n_s: usize) -> Result<Array3<T>> {
    let n_a = v
        .first()
        .and_then(|m| m.first())
        .map(|r| r.len())
        .unwrap_or_default();
    let dims_ok = v.len() == n_s
        && v.iter()
            .all(|m| m.len() == n_s && m.iter().all(|r| r.len() == n_a));
    if !dims_ok {
        return Err(shape_error(field, (n_s, n_s, n_a), "ragged or wrongly sized lists"));
    }

    let flat = v.into_iter().flatten().flatten().collect::<Vec<_>>();
    Array3::from_shape_vec((n_s, n_s, n_a), flat)
        .map_err(|e| shape_error(field, (n_s, n_s, n_a), e))
}

fn shape_error<E: std::fmt::Debug, G: std::fmt::Debug>(field: &str, expected: E, got: G) -> Error {
    Error::ShapeMismatch {
        field: field.to_string(),
        expected: format!("{expected:?}"),
        got: format!("{got:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;
    use crate::mdps::estimator::TransitionRewardEstimator;
    use flappy::GameConfig;
    use tempfile::tempdir;

    fn learned() -> (StateDiscretizer, MdpModel) {
        let discretizer = StateDiscretizer::for_game(
            &GameConfig::default(),
            Resolution {
                n_y: 2,
                n_dx: 3,
                n_dy: 4,
            },
            false,
        )
        .unwrap();
        let mut mdp = MdpModel::new(discretizer.n_s());
        mdp.record(0, 0, 5, 1.).unwrap();
        mdp.record(5, 1, 20, -1000.).unwrap();
        mdp.refresh();
        mdp.value[3] = 2.5;
        (discretizer, mdp)
    }

    #[test]
    fn save_then_load_restores_the_model() {
        let (discretizer, mdp) = learned();
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");

        SavedModel::new(&discretizer, &mdp, 7).save_to_file(&path).unwrap();
        let saved = SavedModel::load_from_file(&path).unwrap().unwrap();
        assert_eq!(saved.episodes, 7);
        assert_eq!(saved.num_states, 24);

        let (d2, m2) = saved.into_parts().unwrap();
        assert_eq!(d2, discretizer);
        assert_eq!(m2, mdp);
    }

    #[test]
    fn missing_file_means_no_model() {
        let dir = tempdir().unwrap();
        let loaded = SavedModel::load_from_file(dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ \"version\": 1, \"num_states\": [").unwrap();
        assert!(matches!(
            SavedModel::load_from_file(&path),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let (discretizer, mdp) = learned();
        let mut saved = SavedModel::new(&discretizer, &mdp, 1);
        saved.transition_probs[3].pop();
        assert!(matches!(saved.into_parts(), Err(Error::ShapeMismatch { .. })));

        let mut saved = SavedModel::new(&discretizer, &mdp, 1);
        saved.reward_counts.pop();
        assert!(matches!(saved.into_parts(), Err(Error::ShapeMismatch { .. })));

        let mut saved = SavedModel::new(&discretizer, &mdp, 1);
        saved.num_states = 10;
        assert!(matches!(saved.into_parts(), Err(Error::ShapeMismatch { .. })));
    }
}
