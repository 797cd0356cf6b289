pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_bucket_list_items.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_bucket_list_items.sql")),
				"tables/002_dating_journal_entries.sql" => out
					.push_str(include_str!("../../../sql/tables/002_dating_journal_entries.sql")),
				"tables/003_dating_ideas.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_dating_ideas.sql")),
				"tables/004_events.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_events.sql")),
				"tables/005_blog_posts.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_blog_posts.sql")),
				"tables/006_dashboard_layout.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_dashboard_layout.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
