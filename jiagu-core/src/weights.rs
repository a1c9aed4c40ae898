//! # Tabela de Pesos (feature → tag → peso)
//!
//! Cada feature tem seu próprio vetor de pesos por tag, então a tabela é um
//! mapa de mapas. O acesso a `(feature, tag)` é O(1), o que importa no laço
//! de treino, onde o mesmo par é atualizado milhares de vezes.

use std::collections::{BTreeMap, HashMap};

/// Pesos aprendidos. Pares ausentes valem `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weights {
    table: HashMap<String, HashMap<String, f64>>,
}

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peso de `(feature, label)`, ou `0.0` se nunca foi definido.
    pub fn get(&self, feature: &str, label: &str) -> f64 {
        self.table
            .get(feature)
            .and_then(|labels| labels.get(label))
            .copied()
            .unwrap_or(0.0)
    }

    /// Define o peso de `(feature, label)`.
    pub fn set(&mut self, feature: &str, label: &str, weight: f64) {
        // Evita alocar a chave quando a feature já existe (caminho quente do treino)
        if let Some(labels) = self.table.get_mut(feature) {
            if let Some(w) = labels.get_mut(label) {
                *w = weight;
            } else {
                labels.insert(label.to_string(), weight);
            }
            return;
        }
        let mut labels = HashMap::new();
        labels.insert(label.to_string(), weight);
        self.table.insert(feature.to_string(), labels);
    }

    /// Remove `(feature, label)`; a feature some da tabela quando fica vazia.
    pub fn remove(&mut self, feature: &str, label: &str) -> Option<f64> {
        let labels = self.table.get_mut(feature)?;
        let removed = labels.remove(label);
        if labels.is_empty() {
            self.table.remove(feature);
        }
        removed
    }

    /// Todos os pares `(tag, peso)` de uma feature.
    pub fn feature_weights<'a>(&'a self, feature: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.table
            .get(feature)
            .into_iter()
            .flat_map(|labels| labels.iter().map(|(l, w)| (l.as_str(), *w)))
    }

    /// Todas as features conhecidas.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Número de pares `(feature, tag)` armazenados.
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Exporta para a forma associativa usada na persistência (ordenada, determinística).
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.table
            .iter()
            .map(|(feature, labels)| {
                let labels = labels.iter().map(|(l, w)| (l.clone(), *w)).collect();
                (feature.clone(), labels)
            })
            .collect()
    }

    /// Reconstrói a tabela a partir da forma persistida.
    pub fn from_map(map: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        let table = map
            .into_iter()
            .filter(|(_, labels)| !labels.is_empty())
            .map(|(feature, labels)| (feature, labels.into_iter().collect()))
            .collect();
        Self { table }
    }
}
