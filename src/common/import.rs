// src/common/import.rs
//
// Importações em lote: cada item é classificado antes de tocar o banco,
// e o resultado lista sucessos e erros por item em vez de abortar o lote.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;
use utoipa::ToSchema;

pub const MOTIVO_JA_EXISTE: &str = "já existe para esta competência.";
pub const MOTIVO_DUPLICADO_NO_LOTE: &str = "item repetido no arquivo de importação.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportErro {
    #[schema(example = "12345")]
    pub item: String,
    #[schema(example = "já existe para esta competência.")]
    pub motivo: String,
}

#[derive(Debug, Serialize)]
pub struct ImportReport<T> {
    pub sucesso: Vec<T>,
    pub erros: Vec<ImportErro>,
}

/// Itens aprovados para inserção + itens rejeitados com o motivo.
#[derive(Debug)]
pub struct ImportPlan<T> {
    pub aceitos: Vec<T>,
    pub erros: Vec<ImportErro>,
}

impl<T> ImportPlan<T> {
    /// Converte o plano em relatório, mapeando cada item aceito já persistido.
    pub fn into_report<U>(self, inseridos: Vec<U>) -> ImportReport<U> {
        ImportReport {
            sucesso: inseridos,
            erros: self.erros,
        }
    }
}

/// Classifica os itens na ordem recebida. Itens com chave repetida no próprio
/// lote são rejeitados a partir da segunda ocorrência; os demais passam por
/// `validar`, que devolve o motivo da recusa.
pub fn classificar<T, K, FK, FV>(itens: Vec<T>, chave: FK, mut validar: FV) -> ImportPlan<T>
where
    K: Eq + Hash + Display,
    FK: Fn(&T) -> K,
    FV: FnMut(&T) -> Result<(), String>,
{
    let mut vistos = HashSet::new();
    let mut plano = ImportPlan {
        aceitos: Vec::with_capacity(itens.len()),
        erros: Vec::new(),
    };

    for item in itens {
        let k = chave(&item);
        let rotulo = k.to_string();
        if !vistos.insert(k) {
            plano.erros.push(ImportErro {
                item: rotulo,
                motivo: MOTIVO_DUPLICADO_NO_LOTE.to_string(),
            });
            continue;
        }
        match validar(&item) {
            Ok(()) => plano.aceitos.push(item),
            Err(motivo) => plano.erros.push(ImportErro { item: rotulo, motivo }),
        }
    }

    plano
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_item_for_competence_is_reported_not_fatal() {
        let existentes: HashSet<i32> = [20].into_iter().collect();
        let plano = classificar(vec![10, 20, 30], |c| *c, |c| {
            if existentes.contains(c) {
                Err(MOTIVO_JA_EXISTE.to_string())
            } else {
                Ok(())
            }
        });

        assert_eq!(plano.aceitos, vec![10, 30]);
        assert_eq!(
            plano.erros,
            vec![ImportErro {
                item: "20".into(),
                motivo: MOTIVO_JA_EXISTE.into()
            }]
        );

        let report = plano.into_report(vec!["10", "30"]);
        assert_eq!(report.sucesso.len(), 2);
        assert_eq!(report.erros.len(), 1);
    }

    #[test]
    fn repeated_keys_in_batch_keep_first_occurrence() {
        let plano = classificar(vec![(1, "a"), (1, "b"), (2, "c")], |i| i.0, |_| Ok(()));
        assert_eq!(plano.aceitos, vec![(1, "a"), (2, "c")]);
        assert_eq!(plano.erros[0].motivo, MOTIVO_DUPLICADO_NO_LOTE);
    }
}
