//! # Averaged Perceptron
//!
//! Classificador linear online usado por todos os modelos do toolkit
//! (segmentação BMES, POS, NER, relações). Utiliza "Lazy Averaging" para evitar
//! custo O(N*T) na atualização dos pesos médios.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{JiaguError, Result};
use crate::features::Feature;
use crate::weights::Weights;

/// Pesos com magnitude até este limiar são descartados na média final.
const PRUNE_EPSILON: f64 = 1e-4;

/// Tag prevista e seu score. `Class::default()` (label vazio) indica que
/// nenhuma feature casou com uma tag conhecida.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub label: String,
    pub score: f64,
}

impl Class {
    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }
}

/// Estado persistido de um perceptron treinado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerceptronModel {
    /// feature → tag → peso.
    pub weights: BTreeMap<String, BTreeMap<String, f64>>,
    /// Conjunto de tags legais.
    pub classes: BTreeSet<String>,
}

/// Modelo Perceptron Médio (Averaged Perceptron).
///
/// O Perceptron é um algoritmo de aprendizado **online** e **mistake-driven**:
/// processa um token por vez e só altera pesos quando erra a predição.
///
/// # Averaged Perceptron
/// O modelo final usa a **média** dos pesos ao longo de todo o treino em vez do
/// último valor visto, o que reduz overfitting aos exemplos mais recentes.
///
/// # Lazy Averaging
/// Para cada par `(feature, tag)` guardamos o acumulado `totals` e o instante
/// da última alteração `tstamps`. Quando o peso é tocado de novo, o intervalo
/// em que ficou constante é somado de uma vez: $totals += (t - tstamp) \cdot w$.
///
/// # Concorrência
/// `predict` recebe `&self` e pode ser compartilhado entre threads após
/// [`average_weights`](Self::average_weights). `update` exige `&mut self`:
/// o treino é sequencial porque os deltas não comutam com o bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AveragedPerceptron {
    weights: Weights,
    classes: BTreeSet<String>,
    /// Soma acumulada por `(feature, tag)`.
    totals: HashMap<(String, String), f64>,
    /// Última instância em que `(feature, tag)` mudou.
    tstamps: HashMap<(String, String), u64>,
    /// Instâncias de treino vistas.
    instances: u64,
}

impl AveragedPerceptron {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstrói um perceptron já treinado a partir do modelo persistido.
    pub fn from_model(model: PerceptronModel) -> Self {
        Self {
            weights: Weights::from_map(model.weights),
            classes: model.classes,
            ..Self::default()
        }
    }

    /// Exporta pesos e tags para persistência.
    pub fn to_model(&self) -> PerceptronModel {
        PerceptronModel {
            weights: self.weights.to_map(),
            classes: self.classes.clone(),
        }
    }

    /// Registra uma tag como legal para predição.
    pub fn add_class(&mut self, label: impl Into<String>) {
        self.classes.insert(label.into());
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn instances(&self) -> u64 {
        self.instances
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Produto escalar das features ativas com os pesos; devolve a melhor tag.
    ///
    /// Apenas tags registradas via [`add_class`](Self::add_class) são
    /// consideradas. Em empate, vence a tag lexicograficamente menor.
    pub fn predict(&self, features: &[Feature]) -> Class {
        let mut scores: HashMap<&str, f64> = HashMap::new();
        for feature in features {
            if feature.is_zero() {
                continue;
            }
            for (label, weight) in self.weights.feature_weights(&feature.label) {
                if !self.classes.contains(label) {
                    continue;
                }
                *scores.entry(label).or_insert(0.0) += weight * feature.value;
            }
        }

        scores
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(label, score)| Class {
                label: label.to_string(),
                score,
            })
            .unwrap_or_default()
    }

    /// Atualiza os pesos após uma predição de treino.
    ///
    /// $w_{correto} \leftarrow w_{correto} + \phi(x)$
    /// $w_{errado} \leftarrow w_{errado} - \phi(x)$
    pub fn update(&mut self, truth: &str, guess: &str, features: &[Feature]) {
        self.instances += 1;
        if truth == guess {
            return;
        }
        for feature in features {
            if feature.is_zero() {
                continue;
            }
            for (label, delta) in [(truth, 1.0), (guess, -1.0)] {
                let weight = self.weights.get(&feature.label, label);
                self.update_feature(&feature.label, label, weight, delta);
            }
        }
    }

    /// Aplica o bookkeeping preguiçoso antes de somar `delta`.
    fn update_feature(&mut self, feature: &str, label: &str, weight: f64, delta: f64) {
        let key = (feature.to_string(), label.to_string());
        let last = self.tstamps.get(&key).copied().unwrap_or(0);
        *self.totals.entry(key.clone()).or_insert(0.0) += (self.instances - last) as f64 * weight;
        self.tstamps.insert(key, self.instances);
        self.weights.set(feature, label, weight + delta);
    }

    /// Substitui cada peso pela sua média ao longo do treino.
    ///
    /// Deve ser chamado uma única vez, depois do último `update`. Médias são
    /// arredondadas a 3 casas; pesos com magnitude até `1e-4` são removidos.
    pub fn average_weights(&mut self) -> Result<()> {
        if self.instances == 0 {
            return Err(JiaguError::NoTrainingInstances);
        }
        let t = self.instances as f64;

        let mut averaged = Vec::with_capacity(self.weights.len());
        for feature in self.weights.features() {
            for (label, weight) in self.weights.feature_weights(feature) {
                let key = (feature.to_string(), label.to_string());
                let last = self.tstamps.get(&key).copied().unwrap_or(0);
                let total = self.totals.get(&key).copied().unwrap_or(0.0)
                    + (self.instances - last) as f64 * weight;
                averaged.push((key, round3(total / t)));
            }
        }

        let mut pruned = 0usize;
        for ((feature, label), avg) in averaged {
            if avg.abs() > PRUNE_EPSILON {
                self.weights.set(&feature, &label, avg);
            } else {
                self.weights.remove(&feature, &label);
                pruned += 1;
            }
        }
        self.totals.clear();
        self.tstamps.clear();

        debug!(instances = self.instances, kept = self.weights.len(), pruned, "pesos médios calculados");
        Ok(())
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feats(keys: &[&str]) -> Vec<Feature> {
        keys.iter().map(|k| Feature::new(*k)).collect()
    }

    #[test]
    fn test_predict_empty_model() {
        let p = AveragedPerceptron::new();
        let class = p.predict(&feats(&["bias"]));
        assert!(class.is_empty());
    }

    #[test]
    fn test_predict_ignores_unregistered_classes() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.update("B", "A", &feats(&["bias"]));
        // "B" tem peso positivo mas não está registrada
        let class = p.predict(&feats(&["bias"]));
        assert_eq!(class.label, "A");
        assert_eq!(class.score, -1.0);
    }

    #[test]
    fn test_predict_tie_breaks_on_smallest_label() {
        let model = PerceptronModel {
            weights: [(
                "bias".to_string(),
                [("b".to_string(), 2.0), ("a".to_string(), 2.0), ("c".to_string(), 1.0)]
                    .into_iter()
                    .collect(),
            )]
            .into_iter()
            .collect(),
            classes: ["a", "b", "c"].iter().map(|s| s.to_string()).collect(),
        };
        let p = AveragedPerceptron::from_model(model);
        for _ in 0..10 {
            assert_eq!(p.predict(&feats(&["bias"])).label, "a");
        }
    }

    #[test]
    fn test_zero_valued_features_are_skipped() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.add_class("B");
        p.update("A", "B", &[Feature::with_value("off", 0.0), Feature::new("on")]);
        assert_eq!(p.weights().get("off", "A"), 0.0);
        assert_eq!(p.weights().get("on", "A"), 1.0);
        assert_eq!(p.weights().get("on", "B"), -1.0);
    }

    #[test]
    fn test_correct_guess_leaves_weights_unchanged() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.add_class("B");
        p.update("A", "B", &feats(&["x", "y"]));
        let before = p.weights().clone();
        p.update("A", "A", &feats(&["x", "y", "z"]));
        assert_eq!(p.weights(), &before);
        assert_eq!(p.instances(), 2);
    }

    #[test]
    fn test_average_weights_without_instances_fails() {
        let mut p = AveragedPerceptron::new();
        assert!(matches!(p.average_weights(), Err(JiaguError::NoTrainingInstances)));
    }

    #[test]
    fn test_lazy_average_matches_eager_average() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.add_class("B");
        // t=1: erro → w(x,A)=1, w(x,B)=-1
        p.update("A", "B", &feats(&["x"]));
        // t=2, t=3: acertos, pesos constantes
        p.update("A", "A", &feats(&["x"]));
        p.update("A", "A", &feats(&["x"]));
        // t=4: erro inverso → w(x,A)=0, w(x,B)=0
        p.update("B", "A", &feats(&["x"]));
        p.average_weights().unwrap();

        // Pesos após cada passo para (x,A): 1, 1, 1, 0 → média = 3/4
        assert_eq!(p.weights().get("x", "A"), 0.75);
        assert_eq!(p.weights().get("x", "B"), -0.75);
    }

    #[test]
    fn test_average_prunes_tiny_weights() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.add_class("B");
        p.update("A", "B", &feats(&["x"]));
        p.update("B", "A", &feats(&["x"]));
        for _ in 0..20_000 {
            p.update("A", "A", &feats(&["x"]));
        }
        p.average_weights().unwrap();
        // média = 1/20002 → arredonda para 0.0 e é descartada
        assert!(p.weights().is_empty());
        assert!(p.to_model().weights.values().flat_map(|m| m.values()).all(|w| w.abs() > 1e-4));
    }

    #[test]
    fn test_bias_feature_learns_class() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.add_class("B");
        let with_bias = feats(&["bias", "w1"]);
        let without_bias = feats(&["w2"]);
        for _ in 0..3 {
            let guess = p.predict(&with_bias).label;
            p.update("A", &guess, &with_bias);
            let guess = p.predict(&without_bias).label;
            p.update("B", &guess, &without_bias);
        }
        p.average_weights().unwrap();
        assert_eq!(p.predict(&feats(&["bias"])).label, "A");
    }

    #[test]
    fn test_model_round_trip() {
        let mut p = AveragedPerceptron::new();
        p.add_class("A");
        p.add_class("B");
        p.update("A", "B", &feats(&["x", "y"]));
        p.average_weights().unwrap();
        let model = p.to_model();
        let restored = AveragedPerceptron::from_model(model.clone());
        assert_eq!(restored.to_model(), model);
        assert_eq!(restored.predict(&feats(&["x"])), p.predict(&feats(&["x"])));
    }
}
