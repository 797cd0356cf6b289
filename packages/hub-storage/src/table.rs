/// Tables the hub reads and writes. Every table carries `id`, `user_id`, and `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
	BucketListItems,
	DatingJournalEntries,
	DatingIdeas,
	Events,
	BlogPosts,
	DashboardLayout,
}
impl Table {
	pub const ALL: [Table; 6] = [
		Table::BucketListItems,
		Table::DatingJournalEntries,
		Table::DatingIdeas,
		Table::Events,
		Table::BlogPosts,
		Table::DashboardLayout,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::BucketListItems => "bucket_list_items",
			Self::DatingJournalEntries => "dating_journal_entries",
			Self::DatingIdeas => "dating_ideas",
			Self::Events => "events",
			Self::BlogPosts => "blog_posts",
			Self::DashboardLayout => "dashboard_layout",
		}
	}
}
impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
