// src/services/lead_normalizer.rs
//
// Leads chegam de formulários, planilhas e integrações com nomes de campo
// diferentes ("Name", "nome", "phone_number", "Celular"...). Esta tabela de
// sinônimos resolve tudo para o formato canônico do CRM.

use serde::Serialize;
use serde_json::{Map, Value};

/// Campos canônicos de um lead, na ordem em que aparecem na tabela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Nome,
    Email,
    Telefone,
    DataContato,
}

/// Sinônimos aceitos para cada campo canônico, em ordem de prioridade.
/// Todos em minúsculas: a comparação com as chaves recebidas ignora caixa.
pub const LEAD_FIELD_SYNONYMS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Nome,
        &[
            "nome",
            "name",
            "full_name",
            "fullname",
            "nome_completo",
            "cliente",
            "client",
            "contact",
            "contato",
            "lead_name",
            "leadname",
        ],
    ),
    (
        CanonicalField::Email,
        &[
            "email",
            "e-mail",
            "e_mail",
            "mail",
            "email_address",
            "emailaddress",
            "endereco_email",
        ],
    ),
    (
        CanonicalField::Telefone,
        &[
            "telefone",
            "phone",
            "phone_number",
            "phonenumber",
            "celular",
            "whatsapp",
            "fone",
            "tel",
            "mobile",
        ],
    ),
    (
        CanonicalField::DataContato,
        &[
            "data_contato",
            "contact_date",
            "contactdate",
            "data",
            "date",
            "created_time",
            "createdtime",
            "created_at",
            "createdat",
        ],
    ),
];

/// Sinônimos da referência à empresa dona do lead.
pub const COMPANY_REF_SYNONYMS: &[&str] = &[
    "empresa_id",
    "empresaid",
    "company_id",
    "companyid",
    "empresa",
    "id_empresa",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeadFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_contato: Option<Value>,
}

impl LeadFields {
    /// Um lead só é aceito se tiver ao menos nome, e-mail ou telefone.
    pub fn has_identity(&self) -> bool {
        self.nome.is_some() || self.email.is_some() || self.telefone.is_some()
    }

    fn slot(&mut self, field: CanonicalField) -> &mut Option<Value> {
        match field {
            CanonicalField::Nome => &mut self.nome,
            CanonicalField::Email => &mut self.email,
            CanonicalField::Telefone => &mut self.telefone,
            CanonicalField::DataContato => &mut self.data_contato,
        }
    }
}

/// Normaliza um payload bruto. Nunca falha: campos não encontrados ficam `None`.
pub fn normalize(raw: &Map<String, Value>) -> LeadFields {
    let mut fields = LeadFields::default();
    for (field, synonyms) in LEAD_FIELD_SYNONYMS {
        *fields.slot(*field) = find_field(raw, synonyms);
    }
    fields
}

/// Primeiro sinônimo (em ordem de prioridade) presente com valor utilizável.
/// Para cada sinônimo a chave exata vem antes das variações de caixa
/// ("empresa_id" vence "EMPRESA_ID"). Strings voltam aparadas.
pub fn find_field(raw: &Map<String, Value>, synonyms: &[&str]) -> Option<Value> {
    synonyms.iter().find_map(|synonym| {
        raw.get(*synonym).and_then(usable).or_else(|| {
            raw.iter()
                .filter(|(key, _)| key.to_lowercase() == *synonym)
                .find_map(|(_, value)| usable(value))
        })
    })
}

/// Referência à empresa, convertida para string ("1" e 1 são a mesma empresa).
pub fn company_ref(raw: &Map<String, Value>) -> Option<String> {
    match find_field(raw, COMPANY_REF_SYNONYMS)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Chaves que o sistema interpretaria como referência à empresa.
pub fn is_company_ref_key(key: &str) -> bool {
    COMPANY_REF_SYNONYMS.contains(&key.to_lowercase().as_str())
}

/// Converte a referência textual em ID numérico de empresa.
pub fn parse_company_id(reference: &str) -> Option<i64> {
    reference.trim().parse().ok()
}

/// Representação textual de um valor normalizado, para colunas TEXT.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn usable(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
        }
        other => Some(other.clone()),
    }
}
