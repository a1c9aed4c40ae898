//! # Tipos de Erro
//!
//! Todas as falhas de biblioteca são devolvidas ao chamador como [`JiaguError`].
//! Não existe política de retry nesta camada: quem chama decide.

/// Result com [`JiaguError`] como erro padrão.
pub type Result<T, E = JiaguError> = std::result::Result<T, E>;

/// Erros que podem surgir ao carregar dicionários/modelos, treinar ou segmentar.
#[derive(Debug, thiserror::Error)]
pub enum JiaguError {
    /// Falha de I/O ao ler dicionário, corpus ou modelo.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Modelo persistido corrompido ou incompatível.
    #[error("modelo inválido: {0}")]
    ModelFormat(#[from] serde_json::Error),

    /// `average_weights` chamado sem nenhuma instância de treino.
    #[error("nenhuma instância de treino observada; impossível calcular a média dos pesos")]
    NoTrainingInstances,

    /// Argumento fora do contrato (ex: sentença com tokens e tags de tamanhos diferentes).
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),

    /// Operação exige um modelo de segmentação que não foi carregado.
    #[error("modelo de segmentação não carregado")]
    ModelNotLoaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "dict"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(JiaguError::Io(_))));
    }

    #[test]
    fn test_model_format_message() {
        let err: JiaguError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("modelo inválido"));
    }
}
