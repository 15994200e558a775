/*
 * Responsibility
 * - 各エンドポイントの request body DTO (共通の基底型は持たない)
 * - 必須フィールドの宣言と、400 時の固定メッセージ
 * - 欠けている最初のフィールド名を返す共通 helper (first_missing)
 */
use serde::Deserialize;

/// A request body whose fields must all be present and non-blank.
pub trait RequiredFields {
    /// Message returned with 400 when parsing or validation fails.
    const MISSING_MESSAGE: &'static str;

    /// `(json field name, value)` in declaration order.
    fn required_fields(&self) -> Vec<(&'static str, &str)>;
}

/// First field that is empty or whitespace only, by name.
pub fn first_missing<T: RequiredFields>(body: &T) -> Option<&'static str> {
    body.required_fields()
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
}

#[derive(Debug, Deserialize)]
pub struct SeedOneByRandIdRequest {
    #[serde(default)]
    pub randid: String,
}

impl RequiredFields for SeedOneByRandIdRequest {
    const MISSING_MESSAGE: &'static str = "RandId is required";

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("randid", self.randid.as_str())]
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedOneByUuidRequest {
    #[serde(default)]
    pub uuid: String,
}

impl RequiredFields for SeedOneByUuidRequest {
    const MISSING_MESSAGE: &'static str = "uuid is required";

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("uuid", self.uuid.as_str())]
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedManyRequest {
    #[serde(default)]
    pub retrievedlengthstr: String,
    #[serde(default)]
    pub lastobjectidhex: String,
    #[serde(default)]
    pub validlastuuid: String,
    #[serde(default)]
    pub campaignuuid: String,
}

impl SeedManyRequest {
    /// Base-10 length the client has already retrieved.
    pub fn retrieved_length(&self) -> Option<i64> {
        self.retrievedlengthstr.parse().ok()
    }
}

impl RequiredFields for SeedManyRequest {
    const MISSING_MESSAGE: &'static str =
        "retrievedlengthstr, lastobjectidhex, validlastuuid, campaignuuid is required";

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("retrievedlengthstr", self.retrievedlengthstr.as_str()),
            ("lastobjectidhex", self.lastobjectidhex.as_str()),
            ("validlastuuid", self.validlastuuid.as_str()),
            ("campaignuuid", self.campaignuuid.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteManyByParticipantRequest {
    #[serde(default)]
    pub uuid: String,
}

impl RequiredFields for DeleteManyByParticipantRequest {
    const MISSING_MESSAGE: &'static str = "uuid is required";

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("uuid", self.uuid.as_str())]
    }
}
