//! Named flag sets with nested subcommand sets.

use crate::error::{FlagError, Result};
use crate::flag::{Flag, FlagKind, valid_name};

/// An ordered set of named flags, optionally containing nested subsets.
///
/// A subset represents a subcommand: when [`parse`](FlagSet::parse)
/// encounters a non-flag token matching a subset name, it descends into that
/// subset and marks it active. After parsing, the chain of active subsets
/// mirrors the subcommand path selected on the command line; exactly one
/// path lights up because descent is driven by token order.
///
/// Flag lookup during parsing searches the active path from the deepest set
/// up to the root, so parent flags remain usable after a subcommand token.
///
/// # Examples
///
/// ```
/// use happy_varflag::{Flag, FlagSet};
///
/// let mut root = FlagSet::new("app").unwrap();
/// root.add(Flag::bool("verbose").unwrap()).unwrap();
///
/// let mut serve = FlagSet::new("serve").unwrap();
/// serve.add(Flag::int("port").unwrap()).unwrap();
/// root.add_set(serve).unwrap();
///
/// let argv: Vec<String> = ["serve", "--port", "8080", "--verbose"]
///     .iter().map(|s| s.to_string()).collect();
/// root.parse(&argv).unwrap();
///
/// let active = root.active_set().unwrap();
/// assert_eq!(active.name(), "serve");
/// assert_eq!(active.get("port").unwrap().value().as_int(), Some(8080));
/// assert!(root.get("verbose").unwrap().present());
/// ```
#[derive(Debug, Clone)]
pub struct FlagSet {
    name: String,
    flags: Vec<Flag>,
    sets: Vec<FlagSet>,
    args: Vec<String>,
    present: bool,
}

impl FlagSet {
    /// Creates an empty flag set with the given name.
    pub fn new(name: &str) -> Result<Self> {
        if !valid_name(name) {
            return Err(FlagError::InvalidName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            flags: Vec::new(),
            sets: Vec::new(),
            args: Vec::new(),
            present: false,
        })
    }

    /// Name of the set (the command it belongs to).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flags owned directly by this set.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Nested subsets.
    pub fn sets(&self) -> &[FlagSet] {
        &self.sets
    }

    /// Positional arguments collected by this set during parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether this set was activated during parsing.
    pub fn present(&self) -> bool {
        self.present
    }

    /// Number of flags owned directly by this set.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether this set owns no flags.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Adds a flag, rejecting duplicate names or aliases within this set.
    pub fn add(&mut self, flag: Flag) -> Result<()> {
        flag.validate_aliases()?;
        let names: Vec<String> = std::iter::once(flag.name().to_string())
            .chain(flag.aliases().iter().cloned())
            .collect();
        for name in &names {
            if self.contains(name) {
                return Err(FlagError::Duplicate(name.clone()));
            }
        }
        self.flags.push(flag);
        Ok(())
    }

    /// Adds a nested subset, rejecting duplicate subset names.
    pub fn add_set(&mut self, set: FlagSet) -> Result<()> {
        if self.sets.iter().any(|s| s.name == set.name) {
            return Err(FlagError::DuplicateSet(set.name));
        }
        self.sets.push(set);
        Ok(())
    }

    /// Finds a flag owned by this set, by name or alias.
    pub fn get(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.matches(name))
    }

    /// Checks whether this set owns a flag with the given name or alias.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The subset activated during parsing, if any.
    pub fn active_set(&self) -> Option<&FlagSet> {
        self.sets.iter().find(|s| s.present)
    }

    /// Decomposes the set into its active chain, root first.
    ///
    /// Each returned set keeps its own flags and positional arguments but
    /// loses its subsets; inactive branches are dropped. The last element is
    /// the deepest set the parse descended into.
    pub fn into_active_chain(self) -> Vec<FlagSet> {
        let mut chain = Vec::new();
        let mut current = self;
        loop {
            let next = current
                .sets
                .iter()
                .position(|s| s.present)
                .map(|i| current.sets.swap_remove(i));
            current.sets.clear();
            chain.push(current);
            match next {
                Some(set) => current = set,
                None => break,
            }
        }
        chain
    }

    /// Parses the argument vector against this set and its subsets.
    ///
    /// Tokens starting with `-` are matched against flags along the active
    /// path (deepest set first). The first non-flag token matching a subset
    /// name descends into that subset; remaining non-flag tokens become
    /// positional arguments of the deepest active set. A literal `--` stops
    /// flag and subcommand recognition entirely.
    pub fn parse(&mut self, argv: &[String]) -> Result<()> {
        self.present = true;
        let mut path: Vec<usize> = Vec::new();
        let mut args_only = false;
        let mut saw_arg = false;
        let mut i = 0;

        while i < argv.len() {
            let token = &argv[i];
            i += 1;

            if args_only {
                self.set_at_mut(&path).args.push(token.clone());
                continue;
            }
            if token == "--" {
                args_only = true;
                continue;
            }

            if token.len() > 1 && token.starts_with('-') && !token.starts_with("---") {
                let body = token.trim_start_matches('-');
                let (name, inline) = match body.split_once('=') {
                    Some((n, v)) => (n, Some(v.to_string())),
                    None => (body, None),
                };
                let Some(flag) = self.flag_on_path_mut(&path, name) else {
                    return Err(FlagError::UnknownFlag(token.clone()));
                };
                match (flag.kind(), inline) {
                    (FlagKind::Bool, v) => flag.set_from(v.as_deref())?,
                    (_, Some(v)) => flag.set_from(Some(&v))?,
                    (_, None) => {
                        let value = argv
                            .get(i)
                            .ok_or_else(|| FlagError::MissingValue(name.to_string()))?;
                        i += 1;
                        flag.set_from(Some(value))?;
                    }
                }
                continue;
            }

            let current = self.set_at_mut(&path);
            let subset = if saw_arg {
                None
            } else {
                current.sets.iter().position(|s| s.name == *token)
            };
            match subset {
                Some(idx) => {
                    current.sets[idx].present = true;
                    path.push(idx);
                }
                None => {
                    current.args.push(token.clone());
                    saw_arg = true;
                }
            }
        }

        Ok(())
    }

    fn set_at_mut(&mut self, path: &[usize]) -> &mut FlagSet {
        let mut current = self;
        for &idx in path {
            current = &mut current.sets[idx];
        }
        current
    }

    /// Finds a flag by name along the active path, deepest set first, so the
    /// nearest definition shadows ancestors.
    fn flag_on_path_mut(&mut self, path: &[usize], name: &str) -> Option<&mut Flag> {
        let depth = {
            let mut chain: Vec<&FlagSet> = Vec::with_capacity(path.len() + 1);
            let mut current: &FlagSet = self;
            chain.push(current);
            for &idx in path {
                current = &current.sets[idx];
                chain.push(current);
            }
            (0..chain.len()).rev().find(|&d| chain[d].contains(name))?
        };
        let set = self.set_at_mut(&path[..depth]);
        set.flags.iter_mut().find(|f| f.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_and_args() {
        let mut set = FlagSet::new("app").unwrap();
        set.add(Flag::bool("verbose").unwrap().with_alias("v")).unwrap();
        set.add(Flag::string("output").unwrap()).unwrap();

        set.parse(&argv(&["-v", "--output=out.txt", "input.txt"]))
            .unwrap();

        assert!(set.get("verbose").unwrap().present());
        assert_eq!(
            set.get("output").unwrap().value().as_str(),
            Some("out.txt")
        );
        assert_eq!(set.args(), &["input.txt".to_string()]);
    }

    #[test]
    fn test_parse_descends_into_subsets() {
        let mut root = FlagSet::new("app").unwrap();
        root.add(Flag::bool("verbose").unwrap()).unwrap();
        let mut service = FlagSet::new("service").unwrap();
        let mut start = FlagSet::new("start").unwrap();
        start.add(Flag::int("port").unwrap()).unwrap();
        service.add_set(start).unwrap();
        root.add_set(service).unwrap();

        root.parse(&argv(&["service", "start", "--port", "9000", "--verbose"]))
            .unwrap();

        let chain = root.into_active_chain();
        let names: Vec<&str> = chain.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["app", "service", "start"]);
        assert_eq!(chain[2].get("port").unwrap().value().as_int(), Some(9000));
        assert!(chain[0].get("verbose").unwrap().present());
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        let mut set = FlagSet::new("app").unwrap();
        assert_eq!(
            set.parse(&argv(&["--nope"])).unwrap_err(),
            FlagError::UnknownFlag("--nope".to_string())
        );
    }

    #[test]
    fn test_parse_requires_value_for_string_flag() {
        let mut set = FlagSet::new("app").unwrap();
        set.add(Flag::string("output").unwrap()).unwrap();
        assert_eq!(
            set.parse(&argv(&["--output"])).unwrap_err(),
            FlagError::MissingValue("output".to_string())
        );
    }

    #[test]
    fn test_double_dash_stops_recognition() {
        let mut root = FlagSet::new("app").unwrap();
        root.add(Flag::bool("verbose").unwrap()).unwrap();
        root.add_set(FlagSet::new("sub").unwrap()).unwrap();

        root.parse(&argv(&["--", "--verbose", "sub"])).unwrap();

        assert!(!root.get("verbose").unwrap().present());
        assert!(root.active_set().is_none());
        assert_eq!(root.args(), &["--verbose".to_string(), "sub".to_string()]);
    }

    #[test]
    fn test_positional_arg_stops_subcommand_matching() {
        let mut root = FlagSet::new("app").unwrap();
        root.add_set(FlagSet::new("sub").unwrap()).unwrap();

        root.parse(&argv(&["value", "sub"])).unwrap();

        assert!(root.active_set().is_none());
        assert_eq!(root.args(), &["value".to_string(), "sub".to_string()]);
    }

    #[test]
    fn test_duplicate_flag_rejected() {
        let mut set = FlagSet::new("app").unwrap();
        set.add(Flag::bool("verbose").unwrap().with_alias("v")).unwrap();
        assert_eq!(
            set.add(Flag::string("v").unwrap()).unwrap_err(),
            FlagError::Duplicate("v".to_string())
        );
    }

    #[test]
    fn test_deepest_definition_shadows_ancestor() {
        let mut root = FlagSet::new("app").unwrap();
        root.add(Flag::string("mode").unwrap()).unwrap();
        let mut sub = FlagSet::new("sub").unwrap();
        sub.add(Flag::string("mode").unwrap()).unwrap();
        root.add_set(sub).unwrap();

        root.parse(&argv(&["sub", "--mode", "fast"])).unwrap();

        assert!(!root.get("mode").unwrap().present());
        assert_eq!(
            root.active_set().unwrap().get("mode").unwrap().value().as_str(),
            Some("fast")
        );
    }
}
