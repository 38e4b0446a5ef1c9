//! Shared fixtures: a mock dictionary site and test configurations

use excavator::Config;
use tempfile::TempDir;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INDEX_PAGE: &str = r#"<html><body>
    <div class="bushou-list">
        <a href="javascript:;" data-action="乙">乙</a>
        <a href="javascript:;" data-action="丨">丨</a>
    </div>
</body></html>"#;

/// `wd=乙`
pub const QUERY_YI: &str = "wd=%E4%B9%99";

/// `wd=丨`
pub const QUERY_GUN: &str = "wd=%E4%B8%A8";

pub const YI_RESPONSE: &str = r#"[
    {"RadicalCharacterArray": [
        {"zi": "乙", "bushou": "乙", "url": "1/YI/", "py": "yǐ", "num": "1"},
        {"zi": "九", "bushou": "乙", "url": "2/JIU/", "py": "jiǔ", "num": "2"}
    ]}
]"#;

pub const GUN_RESPONSE: &str = r#"[
    {"RadicalCharacterArray": [
        {"zi": "中", "bushou": "丨", "url": "4/ZHONG/", "py": "zhōng", "num": "4"}
    ]}
]"#;

pub fn detail_page(summary: &str, notes: &[&str]) -> String {
    let notes: String = notes.iter().map(|n| format!("<li>{}</li>", n)).collect();
    format!(
        r#"<html><body>
            <div class="info"><p class="mui-ellipsis">{}</p></div>
            <div><ul class="hanyu-cha-ul">{}</ul></div>
        </body></html>"#,
        summary, notes
    )
}

/// Builds a configuration pointing at `base_url` with everything written
/// below `dir`
pub fn test_config(dir: &TempDir, base_url: &str) -> Config {
    let mut config = Config::default_for(base_url);
    config.excavator.workspace = dir.path().join("tmp").display().to_string();
    config.excavator.batch_size = 2;
    config.output.database_path = dir.path().join("excavator.db").display().to_string();
    config.http.user_agent = "ExcavatorTest/0.1".to_string();
    config
}

/// Mounts the radical index and both radical queries, each expected `times`
pub async fn mount_discovery(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/bushou/kangxi/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string(QUERY_YI))
        .respond_with(ResponseTemplate::new(200).set_body_string(YI_RESPONSE))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string(QUERY_GUN))
        .respond_with(ResponseTemplate::new(200).set_body_string(GUN_RESPONSE))
        .expect(times)
        .mount(server)
        .await;
}

/// Mounts the three character detail pages, each expected `times`
pub async fn mount_details(server: &MockServer, times: u64) {
    let pages = [
        ("/1/YI", detail_page("拼音：yǐ 部首：乙 总笔画：1", &["天干的第二位"])),
        ("/2/JIU", detail_page("拼音：jiǔ 部首：乙 总笔画：2", &[])),
        (
            "/4/ZHONG",
            detail_page("拼音：zhōng zhòng 部首：丨 部外：3 总笔画：4", &["中心"]),
        ),
    ];

    for (page_path, body) in pages {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(times)
            .mount(server)
            .await;
    }
}
