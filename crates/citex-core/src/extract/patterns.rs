//! Label patterns shared by the regex-based strategies.

use regex::Regex;

use crate::fields::FieldKey;

/// Built-in Portuguese label synonyms per canonical key, most specific
/// first. These cover layouts whose labels drift from the configured
/// mapping (abbreviations, missing diacritics, reworded headers).
pub fn synonyms(key: FieldKey) -> &'static [&'static str] {
    match key {
        FieldKey::FineNumber => &[
            "auto de infração",
            "auto de infracao",
            "número do ait",
            "numero do ait",
            "nº do ait",
        ],
        FieldKey::NotificationDate => &[
            "data da notificação",
            "data da notificacao",
            "notificação da autuação",
        ],
        FieldKey::DefenseDueDate => &[
            "defesa prévia",
            "defesa previa",
            "prazo para defesa",
        ],
        FieldKey::DriverIdDueDate => &[
            "identificação do condutor",
            "identificacao do condutor",
        ],
        FieldKey::LicensePlate => &["placa do veículo", "placa do veiculo", "placa"],
        FieldKey::VehicleModel => &["marca/modelo/versão", "marca/modelo", "modelo"],
        FieldKey::ViolationLocation => &["local da infração", "local da infracao"],
        FieldKey::ViolationDate => &["data da infração", "data da infracao"],
        FieldKey::ViolationTime => &["hora da infração", "hora da infracao"],
        FieldKey::ViolationCode => &[
            "código da infração",
            "codigo da infracao",
            "enquadramento",
        ],
        FieldKey::Amount => &["valor da multa", "valor a pagar"],
        FieldKey::Description => &[
            "descrição da infração",
            "descricao da infracao",
            "infração cometida",
        ],
        FieldKey::MeasuredSpeed => &[
            "medição realizada",
            "medicao realizada",
            "velocidade medida",
        ],
        FieldKey::ConsideredSpeed => &["valor considerado", "velocidade considerada"],
        FieldKey::SpeedLimit => &[
            "limite regulamentado",
            "velocidade regulamentada",
            "limite da via",
        ],
        FieldKey::OwnerName => &["nome do proprietário", "nome do proprietario"],
        FieldKey::OwnerDocument => &["cpf/cnpj", "cpf", "cnpj"],
    }
}

/// Compile a "label, separator, value" pattern for a raw label.
///
/// Case-insensitive; whitespace inside the label is flexible so wrapped
/// labels still match. The value must follow a separator (`:`, `-`, `.`) or
/// whitespace, runs to the end of the line or a two-space column gap, and is
/// capped at 80 characters to avoid swallowing the next label's text.
pub fn labeled_value_pattern(label: &str) -> Regex {
    let escaped = label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(
        r"(?im){escaped}(?:\s*[:.\-]\s*|[ \t]+)(\S[^\n]{{0,79}}?)(?:\s{{2,}}|\s*$)"
    ))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_value_pattern_inline_colon() {
        let re = labeled_value_pattern("PLACA");
        let caps = re.captures("Placa: ABC1234").unwrap();
        assert_eq!(caps[1].trim(), "ABC1234");
    }

    #[test]
    fn test_labeled_value_pattern_multiple_spaces() {
        let re = labeled_value_pattern("VALOR DA MULTA");
        let caps = re.captures("VALOR  DA\nMULTA    R$ 195,23").unwrap();
        assert_eq!(caps[1].trim(), "R$ 195,23");
    }

    #[test]
    fn test_labeled_value_pattern_requires_boundary() {
        // "PLACAR" must not be read as the PLACA label.
        let re = labeled_value_pattern("PLACA");
        assert!(re.captures("PLACAR 10").is_none());
    }

    #[test]
    fn test_value_stops_at_column_gap() {
        let re = labeled_value_pattern("LOCAL DA INFRAÇÃO");
        let caps = re
            .captures("LOCAL DA INFRAÇÃO: AV PAULISTA, 1000  PLACA: ABC1234")
            .unwrap();
        assert_eq!(&caps[1], "AV PAULISTA, 1000");
    }

    #[test]
    fn test_every_key_has_synonyms() {
        for key in FieldKey::ALL {
            assert!(!synonyms(key).is_empty(), "no synonyms for {key}");
        }
    }
}
