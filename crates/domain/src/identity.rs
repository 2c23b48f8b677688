//! # 送信者・受信者の識別情報
//!
//! 外部 Identity サービスから取得したレコードを、通知に必要な射影（[`Info`]）と
//! 言語別の受信者グルーピング（[`ClassificationLang`]）に変換する。
//!
//! ## 設計方針
//!
//! - **純粋な分類ロジック**: HTTP 通信はインフラ層に置き、ここでは取得済みレコードの分類のみを行う
//! - **言語キーは無加工**: 正規化もデフォルト言語へのフォールバックも行わない（空文字列も有効なキー）
//! - **順序保証**: 言語グループはレコードの出現順、グループ内の受信者はリクエストの `to` の順
//! - **送信者の除外**: 送信者のレコードは受信者グループに含めない

use std::collections::HashMap;

use serde::Serialize;

/// レコードの `state` がこの値のとき有効とみなす
pub const ACTIVE_STATE: &str = "active";

/// 識別情報の射影
///
/// 通知の送信者・受信者を表す。構築後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Info {
    /// Identity サービス上のサブジェクト ID
    pub sub:    String,
    /// 表示名
    pub name:   String,
    /// メールアドレス
    pub email:  String,
    /// 有効フラグ（`state == "active"`）
    pub enable: bool,
}

/// Identity サービスから解決された 1 件分のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub info: Info,
    pub lang: String,
}

impl ResolvedIdentity {
    /// レコードの生の値から構築する
    ///
    /// `enable` は `state` が [`ACTIVE_STATE`] と一致するかで決まる。
    pub fn new(
        sub: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        state: &str,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            info: Info {
                sub:    sub.into(),
                name:   name.into(),
                email:  email.into(),
                enable: state == ACTIVE_STATE,
            },
            lang: lang.into(),
        }
    }
}

/// 言語別に分類された受信者と送信者情報
///
/// 1 リクエストにつき 1 回構築され、以降は読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationLang {
    from:      Info,
    from_lang: String,
    langs:     Vec<String>,
    groups:    HashMap<String, Vec<Info>>,
}

impl ClassificationLang {
    /// 取得済みレコードを送信者と言語別の受信者に分類する
    ///
    /// # 引数
    ///
    /// - `from`: 送信者のサブジェクト ID
    /// - `to`: 受信者のサブジェクト ID（この順序がグループ内の順序になる）
    /// - `identities`: Identity サービスの応答（この順序が言語の発見順になる）
    ///
    /// 送信者のレコードが含まれない場合は `None` を返す。
    /// `to` に含まれるが応答に存在しない受信者は、どのグループにも入らない。
    pub fn classify(
        from: &str,
        to: &[String],
        identities: impl IntoIterator<Item = ResolvedIdentity>,
    ) -> Option<Self> {
        let mut sender = None;
        let mut langs: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<(usize, Info)>> = HashMap::new();

        for identity in identities {
            if identity.info.sub == from {
                sender = Some((identity.info, identity.lang));
                continue;
            }
            let Some(position) = to.iter().position(|sub| *sub == identity.info.sub) else {
                continue;
            };
            let bucket = groups.entry(identity.lang.clone()).or_insert_with(|| {
                langs.push(identity.lang.clone());
                Vec::new()
            });
            if bucket.iter().any(|(_, info)| info.sub == identity.info.sub) {
                continue;
            }
            bucket.push((position, identity.info));
        }

        let (from, from_lang) = sender?;

        let groups = groups
            .into_iter()
            .map(|(lang, mut bucket)| {
                bucket.sort_by_key(|(position, _)| *position);
                (lang, bucket.into_iter().map(|(_, info)| info).collect())
            })
            .collect();

        Some(Self {
            from,
            from_lang,
            langs,
            groups,
        })
    }

    /// 送信者情報
    pub fn from(&self) -> &Info {
        &self.from
    }

    /// 送信者の言語
    pub fn from_lang(&self) -> &str {
        &self.from_lang
    }

    /// 発見順の言語キー
    pub fn langs(&self) -> &[String] {
        &self.langs
    }

    /// 指定言語の受信者
    pub fn recipients(&self, lang: &str) -> &[Info] {
        self.groups.get(lang).map(Vec::as_slice).unwrap_or_default()
    }

    /// 言語グループを発見順に走査する
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Info])> {
        self.langs
            .iter()
            .map(|lang| (lang.as_str(), self.recipients(lang)))
    }

    /// 分類された受信者の総数
    pub fn recipient_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn record(sub: &str, name: &str, lang: &str) -> ResolvedIdentity {
        ResolvedIdentity::new(sub, name, format!("{sub}@example.com"), "active", lang)
    }

    fn names(infos: &[Info]) -> Vec<&str> {
        infos.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_言語ごとに受信者を分類する() {
        let to = ids(&["u1", "u2", "u3"]);
        let records = vec![
            record("u1", "Bob", "en"),
            record("u0", "Alice", "en"),
            record("u2", "Carla", "fr"),
            record("u3", "Dan", "en"),
        ];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(cl.langs(), &ids(&["en", "fr"]));
        assert_eq!(names(cl.recipients("en")), vec!["Bob", "Dan"]);
        assert_eq!(names(cl.recipients("fr")), vec!["Carla"]);
        assert_eq!(cl.from().name, "Alice");
        assert_eq!(cl.from_lang(), "en");
        assert_eq!(cl.recipient_count(), 3);
    }

    #[test]
    fn test_言語の順序は発見順でありソートしない() {
        let to = ids(&["u1", "u2", "u3"]);
        let records = vec![
            record("u0", "Alice", "ja"),
            record("u1", "Bob", "zh"),
            record("u2", "Carla", "de"),
            record("u3", "Dan", "zh"),
        ];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(cl.langs(), &ids(&["zh", "de"]));
    }

    #[test]
    fn test_グループ内の順序はtoの順序に従う() {
        let to = ids(&["u3", "u1", "u2"]);
        let records = vec![
            record("u1", "Bob", "en"),
            record("u2", "Carla", "en"),
            record("u3", "Dan", "en"),
            record("u0", "Alice", "en"),
        ];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(names(cl.recipients("en")), vec!["Dan", "Bob", "Carla"]);
    }

    #[test]
    fn test_応答に存在しない受信者はどのグループにも含まれない() {
        let to = ids(&["u1", "missing"]);
        let records = vec![record("u0", "Alice", "en"), record("u1", "Bob", "en")];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(cl.recipient_count(), 1);
        assert_eq!(cl.langs(), &ids(&["en"]));
    }

    #[test]
    fn test_送信者が応答に存在しない場合はnoneを返す() {
        let to = ids(&["u1"]);
        let records = vec![record("u1", "Bob", "en")];

        assert!(ClassificationLang::classify("u0", &to, records).is_none());
    }

    #[test]
    fn test_送信者は受信者グループから除外される() {
        let to = ids(&["u0", "u1"]);
        let records = vec![record("u0", "Alice", "en"), record("u1", "Bob", "en")];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(names(cl.recipients("en")), vec!["Bob"]);
    }

    #[test]
    fn test_空の言語も有効なグループキーになる() {
        let to = ids(&["u1", "u2"]);
        let records = vec![
            record("u0", "Alice", "en"),
            record("u1", "Bob", ""),
            record("u2", "Carla", "en"),
        ];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(cl.langs(), &ids(&["", "en"]));
        assert_eq!(names(cl.recipients("")), vec!["Bob"]);
    }

    #[test]
    fn test_要求していないレコードは無視される() {
        let to = ids(&["u1"]);
        let records = vec![
            record("u0", "Alice", "en"),
            record("u1", "Bob", "en"),
            record("u9", "Zed", "fr"),
        ];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();

        assert_eq!(cl.langs(), &ids(&["en"]));
    }

    #[test]
    fn test_groupsは発見順に言語と受信者を返す() {
        let to = ids(&["u1", "u2"]);
        let records = vec![
            record("u0", "Alice", "en"),
            record("u1", "Bob", "en"),
            record("u2", "Carla", "fr"),
        ];

        let cl = ClassificationLang::classify("u0", &to, records).unwrap();
        let groups: Vec<(&str, Vec<&str>)> = cl
            .groups()
            .map(|(lang, infos)| (lang, names(infos)))
            .collect();

        assert_eq!(groups, vec![("en", vec!["Bob"]), ("fr", vec!["Carla"])]);
    }

    #[rstest]
    #[case("active", true)]
    #[case("inactive", false)]
    #[case("", false)]
    fn test_stateがactiveのときだけ有効になる(#[case] state: &str, #[case] expected: bool) {
        let identity = ResolvedIdentity::new("u1", "Bob", "bob@example.com", state, "en");
        assert_eq!(identity.info.enable, expected);
    }
}
