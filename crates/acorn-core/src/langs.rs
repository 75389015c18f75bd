//! Language alias catalog.
//!
//! Maps free-form language tokens ("py", "c++", "c言語", …) to canonical
//! language ids. The table is static and ordered; when a short alias could
//! belong to more than one language, the first registered entry wins, so
//! resolution stays deterministic.

use crate::text::normalize_token;

/// Canonical language id. Interned in the static catalog; comparisons are
/// pointer-free `&str` equality.
pub type LangId = &'static str;

pub struct LangEntry {
    pub id: LangId,
    /// Already NFKC-normalized and lowercased.
    pub aliases: &'static [&'static str],
}

#[rustfmt::skip]
const LANGS: &[LangEntry] = &[
    LangEntry { id: "ada", aliases: &["ada", "adb"] },
    LangEntry { id: "assembly", aliases: &["assemblyx64", "assembly", "asm"] },
    LangEntry { id: "awk", aliases: &["awk"] },
    LangEntry { id: "bash", aliases: &["bash", "bashscript", "sh", "shell", "shellscript"] },
    LangEntry { id: "basic", aliases: &["basic"] },
    LangEntry { id: "bc", aliases: &["bc"] },
    LangEntry { id: "brainfuck", aliases: &["brainfuck", "bf", "b", "brainf*ck", "brainfu*k", "brainf**k"] },
    LangEntry { id: "c", aliases: &["c", "clang", "c言語"] },
    LangEntry { id: "carp", aliases: &["carp"] },
    LangEntry { id: "clojure", aliases: &["clojure", "clj"] },
    LangEntry { id: "cobol", aliases: &["cobol", "cbl"] },
    LangEntry { id: "coffeescript", aliases: &["coffeescript", "coffee"] },
    LangEntry { id: "cpp", aliases: &["c++", "cpp", "cc", "cxx"] },
    LangEntry { id: "crystal", aliases: &["crystal", "cr"] },
    LangEntry { id: "csharp", aliases: &["c#", "csharp", "cs"] },
    LangEntry { id: "cyber", aliases: &["cyber", "cy"] },
    LangEntry { id: "cython", aliases: &["cython", "pyx"] },
    LangEntry { id: "d", aliases: &["d", "dlang", "d言語"] },
    LangEntry { id: "dart", aliases: &["dart"] },
    LangEntry { id: "dc", aliases: &["dc"] },
    LangEntry { id: "deno", aliases: &["deno"] },
    LangEntry { id: "eclipse", aliases: &["eclipse", "ecl"] },
    LangEntry { id: "elixir", aliases: &["elixir", "exs"] },
    LangEntry { id: "emacslisp", aliases: &["emacslisp", "emacs", "el"] },
    LangEntry { id: "erlang", aliases: &["erlang", "erl"] },
    LangEntry { id: "factor", aliases: &["factor"] },
    LangEntry { id: "fish", aliases: &["><>", "fish"] },
    LangEntry { id: "forth", aliases: &["forth"] },
    LangEntry { id: "fortran", aliases: &["fortran", "f90"] },
    LangEntry { id: "fsharp", aliases: &["f#", "fsharp", "fs"] },
    LangEntry { id: "go", aliases: &["go", "golang", "go言語"] },
    LangEntry { id: "groovy", aliases: &["groovy"] },
    LangEntry { id: "haskell", aliases: &["haskell", "hs"] },
    LangEntry { id: "haxe", aliases: &["haxe", "hx"] },
    LangEntry { id: "java", aliases: &["java", "30億のデバイスで走る言語", "30億のデバイスで動く言語"] },
    LangEntry { id: "javascript", aliases: &["javascript", "js", "cjs", "node", "nodejs", "node.js"] },
    LangEntry { id: "jq", aliases: &["jq"] },
    LangEntry { id: "julia", aliases: &["julia", "jl"] },
    LangEntry { id: "koka", aliases: &["koka", "kk"] },
    LangEntry { id: "kotlin", aliases: &["kotlin", "kt"] },
    LangEntry { id: "lazyk", aliases: &["lazyk", "lazy"] },
    LangEntry { id: "lisp", aliases: &["lisp", "神の言語"] },
    LangEntry { id: "llvmir", aliases: &["llvmir", "ll"] },
    LangEntry { id: "lua", aliases: &["lua"] },
    LangEntry { id: "mercury", aliases: &["mercury"] },
    LangEntry { id: "mysql", aliases: &["mysql", "sql"] },
    LangEntry { id: "nako", aliases: &["なでしこ", "ナデシコ", "nadesiko", "nadeshiko", "nako", "nako3"] },
    LangEntry { id: "nibbles", aliases: &["nibbles", "nbl"] },
    LangEntry { id: "nim", aliases: &["nim"] },
    LangEntry { id: "objectivec", aliases: &["objective-c", "objectivec", "m", "mm"] },
    LangEntry { id: "ocaml", aliases: &["ocaml", "ml"] },
    LangEntry { id: "octave", aliases: &["octave"] },
    LangEntry { id: "openssl", aliases: &["openssl", "ssl.sh"] },
    LangEntry { id: "pascal", aliases: &["pascal", "pas", "p"] },
    LangEntry { id: "perl", aliases: &["perl", "pl"] },
    LangEntry { id: "php", aliases: &["php"] },
    LangEntry { id: "pony", aliases: &["pony"] },
    LangEntry { id: "powershell", aliases: &["powershell", "pwsh", "ps1"] },
    LangEntry { id: "produire", aliases: &["プロデル", "ぷろでる", "produire", "rdr"] },
    LangEntry { id: "prolog", aliases: &["prolog"] },
    LangEntry { id: "pypy", aliases: &["pypy", "pypy3"] },
    LangEntry { id: "pypy2", aliases: &["pypy2"] },
    LangEntry { id: "python", aliases: &["python", "python3", "py", "py3", "cpython", "cpython3"] },
    LangEntry { id: "python2", aliases: &["python2", "py2", "cpython2"] },
    LangEntry { id: "r", aliases: &["r", "rlang", "r言語"] },
    LangEntry { id: "raku", aliases: &["raku", "p6"] },
    LangEntry { id: "reasonml", aliases: &["reasonml", "re", "reason"] },
    LangEntry { id: "ruby", aliases: &["ruby", "rb"] },
    LangEntry { id: "rust", aliases: &["rust", "rs"] },
    LangEntry { id: "sagemath", aliases: &["sagemath", "sage"] },
    LangEntry { id: "scala", aliases: &["scala"] },
    LangEntry { id: "scheme", aliases: &["scheme", "scm"] },
    LangEntry { id: "sed", aliases: &["sed"] },
    LangEntry { id: "seed7", aliases: &["seed7", "sd7"] },
    LangEntry { id: "solidity", aliases: &["solidity", "sol"] },
    LangEntry { id: "sqlite", aliases: &["sqlite"] },
    LangEntry { id: "swift", aliases: &["swift"] },
    LangEntry { id: "text", aliases: &["text", "txt", "cat", "plain", "plaintext"] },
    LangEntry { id: "typescript", aliases: &["typescript", "ts", "cts", "ts-node"] },
    LangEntry { id: "v", aliases: &["v"] },
    LangEntry { id: "vim", aliases: &["vimscript", "vim"] },
    LangEntry { id: "visualbasic", aliases: &["visualbasic", "vb"] },
    LangEntry { id: "whitespace", aliases: &["whitespace", "ws"] },
    LangEntry { id: "zig", aliases: &["zig"] },
    LangEntry { id: "zsh", aliases: &["zsh"] },
];

/// Immutable alias table, built once and injected wherever tokens need
/// resolving.
#[derive(Clone, Copy)]
pub struct LanguageCatalog {
    entries: &'static [LangEntry],
}

impl LanguageCatalog {
    pub fn builtin() -> Self {
        Self { entries: LANGS }
    }

    /// Exact alias lookup after NFKC + case folding. First matching entry
    /// wins.
    pub fn resolve(&self, token: &str) -> Option<LangId> {
        let token = normalize_token(token);
        self.entries
            .iter()
            .find(|entry| entry.aliases.contains(&token.as_str()))
            .map(|entry| entry.id)
    }

    pub fn entries(&self) -> &'static [LangEntry] {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_alias_resolves_to_its_language() {
        let catalog = LanguageCatalog::builtin();
        for entry in catalog.entries() {
            for alias in entry.aliases {
                assert_eq!(catalog.resolve(alias), Some(entry.id), "alias {:?}", alias);
                assert_eq!(
                    catalog.resolve(&alias.to_uppercase()),
                    Some(entry.id),
                    "alias {:?} uppercased",
                    alias
                );
            }
        }
    }

    #[test]
    fn test_resolution_is_case_and_form_insensitive() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.resolve("PY"), Some("python"));
        assert_eq!(catalog.resolve("C++"), Some("cpp"));
        assert_eq!(catalog.resolve("ＰＹ"), Some("python"));
        assert_eq!(catalog.resolve("Node.JS"), Some("javascript"));
    }

    #[test]
    fn test_non_ascii_aliases() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.resolve("c言語"), Some("c"));
        assert_eq!(catalog.resolve("なでしこ"), Some("nako"));
        assert_eq!(catalog.resolve("神の言語"), Some("lisp"));
        assert_eq!(catalog.resolve("30億のデバイスで走る言語"), Some("java"));
        assert_eq!(catalog.resolve("><>"), Some("fish"));
    }

    #[test]
    fn test_first_registered_entry_wins_shared_tokens() {
        let catalog = LanguageCatalog::builtin();
        // "sql" belongs to mysql; sqlite does not register it.
        assert_eq!(catalog.resolve("sql"), Some("mysql"));
        // "m" is claimed only by objective-c; mercury and octave leave it
        // unregistered rather than shadow it.
        assert_eq!(catalog.resolve("m"), Some("objectivec"));
    }

    #[test]
    fn test_catalog_size() {
        assert!(LanguageCatalog::builtin().entries().len() >= 80);
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(LanguageCatalog::builtin().resolve("malbolge"), None);
    }
}
