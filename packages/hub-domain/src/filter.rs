/// A conjunction of optional predicates over a fetched list.
pub trait Filter<T> {
	fn matches(&self, item: &T) -> bool;
}

/// Keeps the items every active predicate accepts, in their fetched order.
pub fn apply<T, F>(items: Vec<T>, filter: &F) -> Vec<T>
where
	F: Filter<T>,
{
	items.into_iter().filter(|item| filter.matches(item)).collect()
}

pub(crate) fn accepts<V>(wanted: Option<&V>, actual: &V) -> bool
where
	V: PartialEq,
{
	wanted.is_none_or(|wanted| wanted == actual)
}
