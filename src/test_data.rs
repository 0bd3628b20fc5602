#[cfg(test)]
pub const META_BILINGUAL: &str = r##"{
  "slug": "vibe-coding",
  "title": "氛圍編程筆記",
  "titleEn": "Vibe coding notes",
  "date": "2025-06-15",
  "tags": ["AI開發", "工具"],
  "tagsEn": ["AI Development", "Tools"],
  "summary": "和 AI 一起寫程式的筆記",
  "summaryEn": "Notes on coding with AI",
  "description": "記錄我使用 AI 工具開發的過程",
  "heroImage": "/images/vibe.png"
}"##;

#[cfg(test)]
pub const META_ZH_ONLY: &str = r##"{
  "slug": "installing-mcp-servers",
  "title": "安裝 MCP Servers",
  "date": "2025-01-01",
  "tags": ["MCP", "工具"],
  "summary": "記錄我安裝的 MCP servers"
}"##;

#[cfg(test)]
pub const BODY_ZH: &str = "<h1>安裝 MCP Servers</h1>\n<p>內容</p>\n";

#[cfg(test)]
pub const BODY_EN: &str = "<h1>Vibe coding notes</h1>\n<p>Content</p>\n";
