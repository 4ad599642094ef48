//! Static pattern catalog used by the risk classifier.
//!
//! Entries are evaluated in declaration order with case-insensitive,
//! unanchored search. Several entries may match one command; the reviewer
//! keeps all of them and reports the most severe.

use clioraops_core::RiskLevel;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Recursive-and-force flag spellings accepted by `rm`
const RM_RECURSIVE_FORCE: &str = r"(?:-[a-z]*r[a-z]*f[a-z]*|-[a-z]*f[a-z]*r[a-z]*|-r\s+-f|-f\s+-r|--recursive\s+--force|--force\s+--recursive)";

/// A single catalog rule
#[derive(Debug, Clone)]
pub struct CommandPattern {
    /// Stable identifier for logs and tests
    pub id: &'static str,
    regex: Regex,
    pub risk_level: RiskLevel,
    /// One-line summary shown as the review message
    pub description: &'static str,
    pub beginner_explanation: &'static str,
    pub architect_explanation: &'static str,
    pub safe_alternative: &'static str,
    pub learning_note: &'static str,
}

impl CommandPattern {
    /// Source text of the compiled expression
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Case-insensitive substring search against the command text
    pub fn matches(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }
}

impl PartialEq for CommandPattern {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CommandPattern {}

/// Uncompiled rule as declared in [RULES]
struct Rule {
    id: &'static str,
    pattern: &'static str,
    risk_level: RiskLevel,
    description: &'static str,
    beginner: &'static str,
    architect: &'static str,
    alternative: &'static str,
    note: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        id: "rm-rf-root",
        pattern: r#"\brm\s+RMRF\s+(?:--\s+)?(?:--no-preserve-root\s+)?(?:--\s+)?["']?(?:/|~|\*)"#,
        risk_level: RiskLevel::Critical,
        description: "Recursive force delete from root, home, or a bare glob",
        beginner: "This deletes everything under the given path without asking, including system files. There is no undo.",
        architect: "Unbounded recursive unlink on an absolute or home-relative path; irreversible and bypasses prompts.",
        alternative: "rm -rf ./target-directory",
        note: "Point rm at a specific relative path and run `ls` on it first to see what would go.",
    },
    Rule {
        id: "rm-rf-variable",
        pattern: r#"\brm\s+RMRF\s+(?:--\s+)?["']?\$\{?\w+"#,
        risk_level: RiskLevel::Critical,
        description: "Recursive force delete of a variable path",
        beginner: "If the variable is empty or unset, this becomes `rm -rf /` or deletes the wrong directory.",
        architect: "Unguarded variable expansion in a recursive delete; an empty value widens the target to the parent or root.",
        alternative: r#"[[ -n "$MY_DIR" ]] && rm -rf "$MY_DIR" || echo "Variable is empty!""#,
        note: "Use `set -u` and check variables are non-empty before destructive commands.",
    },
    Rule {
        id: "dd-device",
        pattern: r"\bdd\s+[^|;&]*\b(?:if|of)=",
        risk_level: RiskLevel::Critical,
        description: "Raw disk copy with dd",
        beginner: "dd copies raw bytes between devices. A wrong `of=` silently overwrites a whole disk.",
        architect: "Block-level write with no filesystem safety net; target device mistakes are unrecoverable.",
        alternative: "lsblk  # confirm the exact device before any dd",
        note: "Double-check `of=` against `lsblk` output; dd has no confirmation step.",
    },
    Rule {
        id: "mkfs",
        pattern: r"\bmkfs(?:\.\w+)?\b",
        risk_level: RiskLevel::Critical,
        description: "Filesystem creation",
        beginner: "Formatting a device erases all data on it.",
        architect: "mkfs reinitialises the target's filesystem metadata; existing data is lost.",
        alternative: "lsblk -f  # inspect devices and filesystems first",
        note: "Never format a device you have not positively identified as empty or expendable.",
    },
    Rule {
        id: "block-device-write",
        pattern: r">\s*/dev/(?:sd[a-z]|hd[a-z]|xvd[a-z]|vd[a-z]|nvme\d|disk\d)",
        risk_level: RiskLevel::Critical,
        description: "Redirecting output onto a block device",
        beginner: "Writing straight to a disk device corrupts its partitions and data.",
        architect: "Shell redirection to a raw block device clobbers the partition table and filesystems.",
        alternative: "command > ./output.img",
        note: "Redirect into files, not into /dev entries other than /dev/null.",
    },
    Rule {
        id: "fork-bomb",
        pattern: r":\(\)\s*\{",
        risk_level: RiskLevel::Critical,
        description: "Fork bomb",
        beginner: "This function copies itself endlessly until the machine freezes.",
        architect: "Self-replicating function exhausts the process table; needs ulimit or a reboot to recover.",
        alternative: "ulimit -u  # inspect process limits instead",
        note: "Set per-user process limits on shared machines.",
    },
    Rule {
        id: "remote-pipe-shell",
        pattern: r"\b(?:curl|wget)\b[^|]*\|\s*(?:sudo\s+)?(?:(?:ba|z|da|k)?sh|python3?)\b",
        risk_level: RiskLevel::Critical,
        description: "Piping a remote script straight into a shell",
        beginner: "This runs code from the internet without you seeing it first.",
        architect: "Unverified remote code execution; no integrity check, and partial downloads execute truncated scripts.",
        alternative: "curl -o script.sh https://example.com/script.sh && less script.sh && bash script.sh",
        note: "Download, read, and verify checksums before executing remote scripts.",
    },
    Rule {
        id: "eval-dynamic",
        pattern: r"\b(?:eval|exec)\s+.*(?:\$\{|\$\(|\$\w|`)",
        risk_level: RiskLevel::Critical,
        description: "eval/exec with dynamic input",
        beginner: "Running text built from variables lets whoever controls that text run any command.",
        architect: "Command injection surface: expansion output is re-parsed and executed by the shell.",
        alternative: r#""$cmd" "$@"  # call the program directly with quoted arguments"#,
        note: "Avoid eval; pass arguments as arrays instead of rebuilding command strings.",
    },
    Rule {
        id: "kubectl-delete-production",
        pattern: r"\bkubectl\s+delete\s+(?:pods?|deployments?|services?|namespaces?|ns|all)\b.*\bprod(?:uction)?\b",
        risk_level: RiskLevel::Critical,
        description: "Deleting Kubernetes resources in production",
        beginner: "This removes live resources that real users depend on.",
        architect: "Direct deletion against a production namespace bypasses rollout controls and causes downtime.",
        alternative: "kubectl delete pod <pod-name> --namespace=staging",
        note: "Use `--dry-run=client` and change production through your deployment pipeline.",
    },
    Rule {
        id: "drop-database",
        pattern: r"\bdrop\s+(?:database|schema)\b",
        risk_level: RiskLevel::Critical,
        description: "Dropping a database",
        beginner: "This permanently deletes the database and every table in it.",
        architect: "Irreversible DDL; recovery depends entirely on backups and their restore time.",
        alternative: "pg_dump mydb > mydb_backup.sql  # back up before any destructive DDL",
        note: "Take and verify a backup before destructive schema changes.",
    },
    Rule {
        id: "sudo-unrestricted",
        pattern: r"\bsudo(?:\s+-[a-z]*[si]\b|\s+su\b|\s+(?:ba|z|da|k|fi)?sh\b|\s*$)",
        risk_level: RiskLevel::Dangerous,
        description: "Unrestricted root shell",
        beginner: "This opens a shell where every following command runs as the administrator.",
        architect: "Interactive root session; no per-command audit trail or least-privilege scoping.",
        alternative: "sudo systemctl restart service  # Specify the exact command",
        note: "Grant and use sudo for specific commands rather than whole shells.",
    },
    Rule {
        id: "hardcoded-secret",
        pattern: r#"(?:api_key|apikey|secret|password|passwd|token)\s*=\s*['"][^'"\s]{8,}['"]"#,
        risk_level: RiskLevel::Dangerous,
        description: "Hardcoded secret",
        beginner: "Secrets typed into commands end up in shell history and logs where others can read them.",
        architect: "Credential material in plaintext; leaks via history, process listings, and CI logs.",
        alternative: r#"export MY_SECRET="$(cat ~/.secrets/my_secret)""#,
        note: "Load secrets from a secret manager or an env file outside version control.",
    },
    Rule {
        id: "chmod-world-writable",
        pattern: r"\bchmod\s+(?:-[a-z]+\s+)*(?:0?777|a\+rwx|ugo\+rwx|o\+w)\b",
        risk_level: RiskLevel::Dangerous,
        description: "World-writable permissions",
        beginner: "777 lets every user on the machine change or replace the file.",
        architect: "World-writable mode enables tampering and privilege escalation through replaced binaries or scripts.",
        alternative: "chmod 644 file  # or chmod 755 for executables",
        note: "Grant the least permission needed: owner write, group and others read.",
    },
    Rule {
        id: "chmod-remove-all",
        pattern: r"\bchmod\s+(?:-[a-z]+\s+)*0?000\b",
        risk_level: RiskLevel::Dangerous,
        description: "Removing all permissions",
        beginner: "Nobody, including you, will be able to read or run the file afterwards.",
        architect: "Mode 000 locks out every principal except root; services depending on the path fail.",
        alternative: "chmod 600 file  # owner-only access",
        note: "Restrict to the owner instead of removing access entirely.",
    },
    Rule {
        id: "chown-recursive-absolute",
        pattern: r"\bchown\s+(?:-[a-z]+\s+)*-[a-z]*r[a-z]*\s+\S+\s+/",
        risk_level: RiskLevel::Dangerous,
        description: "Recursive ownership change on an absolute path",
        beginner: "Changing who owns system folders can stop programs and logins from working.",
        architect: "Recursive chown on system paths breaks setuid binaries and service ownership assumptions.",
        alternative: "chown -R user:group ./project-dir",
        note: "Scope ownership changes to directories you own.",
    },
    Rule {
        id: "docker-privileged",
        pattern: r"\bdocker\s+run\b.*--privileged",
        risk_level: RiskLevel::Dangerous,
        description: "Privileged container",
        beginner: "A privileged container can control the host machine, not just itself.",
        architect: "--privileged disables namespace and capability isolation; container escape is trivial.",
        alternative: "docker run --cap-add=SYS_ADMIN image",
        note: "Add only the specific capabilities the workload needs.",
    },
    Rule {
        id: "find-delete",
        pattern: r"\bfind\b.*\s(?:-delete\b|-exec(?:dir)?\s+rm\b)",
        risk_level: RiskLevel::Dangerous,
        description: "find with a destructive action",
        beginner: "Every file the search matches is deleted immediately; a broad pattern deletes far more than expected.",
        architect: "Bulk unlink driven by a predicate; an over-broad match is applied without review.",
        alternative: "find . -name '*.tmp' -print  # review matches, then add -delete",
        note: "Run the same find with -print first and inspect the list.",
    },
    Rule {
        id: "rm-recursive",
        pattern: r"\brm\s+(?:-[a-z]*r[a-z]*|--recursive)\b",
        risk_level: RiskLevel::Dangerous,
        description: "Recursive delete",
        beginner: "This deletes a folder and everything inside it. Deleted files do not go to a trash bin.",
        architect: "Recursive unlink; irreversible without backups or snapshots.",
        alternative: "rm -ri ./directory  # confirm each file",
        note: "Use -i, or move to a scratch directory first, when unsure.",
    },
    Rule {
        id: "sudo",
        pattern: r"\bsudo\b",
        risk_level: RiskLevel::Caution,
        description: "Elevated privileges",
        beginner: "sudo runs the command as the administrator, so mistakes affect the whole system.",
        architect: "Privileged execution; confirm the command needs root and is scoped narrowly.",
        alternative: "sudo -l  # list what you are allowed to run",
        note: "Run as your own user whenever root is not required.",
    },
    Rule {
        id: "git-force-push",
        pattern: r"\bgit\s+push\b.*\s(?:-f|--force)(?:\s|$)",
        risk_level: RiskLevel::Caution,
        description: "Force push",
        beginner: "Force pushing can erase teammates' commits on the remote branch.",
        architect: "Rewrites remote history unconditionally; concurrent pushes are lost.",
        alternative: "git push --force-with-lease origin branch-name",
        note: "--force-with-lease refuses to overwrite work you have not fetched.",
    },
    Rule {
        id: "git-discard",
        pattern: r"\bgit\s+(?:reset\s+--hard|clean\s+-[a-z]*f)",
        risk_level: RiskLevel::Caution,
        description: "Discarding local git changes",
        beginner: "Uncommitted work is thrown away and cannot be recovered from git.",
        architect: "Destroys working-tree state outside the reflog's protection.",
        alternative: "git stash push -u  # set changes aside instead",
        note: "Stash or commit to a scratch branch before resetting.",
    },
    Rule {
        id: "service-stop",
        pattern: r"\bsystemctl\s+(?:stop|disable|mask|kill)\b",
        risk_level: RiskLevel::Caution,
        description: "Stopping or disabling a service",
        beginner: "Anything that depends on this service stops working until it is started again.",
        architect: "Service unavailability; check dependants and whether the unit is restarted on boot.",
        alternative: "systemctl status service  # inspect before stopping",
        note: "Check `systemctl list-dependencies --reverse` before stopping shared services.",
    },
    Rule {
        id: "process-kill",
        pattern: r"\b(?:kill\s+-(?:9|kill)|killall|pkill)\b",
        risk_level: RiskLevel::Caution,
        description: "Forceful process termination",
        beginner: "Killed programs cannot save their work or clean up.",
        architect: "SIGKILL and name-based kills skip graceful shutdown and may hit unintended processes.",
        alternative: "kill -TERM <pid>  # ask the process to exit cleanly",
        note: "Send SIGTERM first and target PIDs rather than names.",
    },
    Rule {
        id: "package-removal",
        pattern: r"\b(?:apt|apt-get|yum|dnf|brew|pip3?|npm)\s+(?:remove|purge|uninstall|autoremove)\b",
        risk_level: RiskLevel::Caution,
        description: "Package removal",
        beginner: "Removing packages can also remove things other programs need.",
        architect: "Dependency removal may cascade; review the transaction before accepting.",
        alternative: "apt-get remove --simulate package  # preview the removal",
        note: "Preview removals with the package manager's dry-run option.",
    },
    Rule {
        id: "docker-prune",
        pattern: r"\bdocker\s+(?:system\s+prune|volume\s+(?:rm|prune)|rmi?\s+-f)\b",
        risk_level: RiskLevel::Caution,
        description: "Removing Docker data",
        beginner: "This deletes containers, images, or volumes, and data in volumes is lost.",
        architect: "Volume and image removal is irreversible; cached layers must be re-pulled.",
        alternative: "docker system df  # see what would be reclaimed",
        note: "List what exists before pruning, especially volumes.",
    },
    Rule {
        id: "code-eval",
        pattern: r"\beval\s*\(",
        risk_level: RiskLevel::Caution,
        description: "eval() call",
        beginner: "eval runs text as code, which is risky if any of that text comes from users.",
        architect: "Dynamic evaluation; injection risk depends on the provenance of the evaluated string.",
        alternative: "json.loads(text)  # parse data instead of evaluating it",
        note: "Parse structured data with a parser rather than evaluating it.",
    },
    Rule {
        id: "read-only-inspection",
        pattern: r"\b(?:ls|pwd|whoami|df|du|free|uptime|ps|top|htop|cat|head|tail|wc|stat|uname|hostname|grep|which)\b",
        risk_level: RiskLevel::Safe,
        description: "Read-only inspection",
        beginner: "This only looks at the system and does not change anything.",
        architect: "Read-only query; no state mutation.",
        alternative: "ls -la",
        note: "Inspection commands are a good first step before any change.",
    },
    Rule {
        id: "find-read-only",
        pattern: r"\bfind\s+\S",
        risk_level: RiskLevel::Safe,
        description: "File search",
        beginner: "find searches for files and prints them; it changes nothing unless told to delete or execute.",
        architect: "Filesystem traversal without mutating actions.",
        alternative: "find . -name '*.log' -print",
        note: "Add -maxdepth to keep large searches fast.",
    },
    Rule {
        id: "docker-read-only",
        pattern: r"\bdocker\s+(?:ps|images|logs|inspect|stats|version|info)\b",
        risk_level: RiskLevel::Safe,
        description: "Docker inspection",
        beginner: "This lists or describes containers and images without changing them.",
        architect: "Read-only Docker API query.",
        alternative: "docker ps -a",
        note: "`docker ps -a` includes stopped containers.",
    },
    Rule {
        id: "git-read-only",
        pattern: r"\bgit\s+(?:status|log|diff|show|branch)\b",
        risk_level: RiskLevel::Safe,
        description: "Git inspection",
        beginner: "This shows the state or history of the repository without changing it.",
        architect: "Read-only git porcelain.",
        alternative: "git status --short",
        note: "Check `git status` before commands that modify the tree.",
    },
    Rule {
        id: "kubectl-read-only",
        pattern: r"\bkubectl\s+(?:get|describe|logs|top)\b",
        risk_level: RiskLevel::Safe,
        description: "Kubernetes inspection",
        beginner: "This reads cluster state without changing anything.",
        architect: "Read-only API server query.",
        alternative: "kubectl get pods -o wide",
        note: "Add `-n <namespace>` to make sure you are looking at the right environment.",
    },
];

fn compile(rule: &Rule) -> Result<CommandPattern, regex::Error> {
    let source = rule.pattern.replace("RMRF", RM_RECURSIVE_FORCE);
    let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;

    Ok(CommandPattern {
        id: rule.id,
        regex,
        risk_level: rule.risk_level,
        description: rule.description,
        beginner_explanation: rule.beginner,
        architect_explanation: rule.architect,
        safe_alternative: rule.alternative,
        learning_note: rule.note,
    })
}

static CATALOG: LazyLock<Vec<CommandPattern>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| compile(rule).unwrap_or_else(|e| panic!("catalog rule '{}' does not compile: {}", rule.id, e)))
        .collect()
});

/// The process-wide catalog, compiled on first use and never mutated
pub fn catalog() -> &'static [CommandPattern] {
    &CATALOG
}

/// Look up a catalog entry by id
pub fn find_pattern(id: &str) -> Option<&'static CommandPattern> {
    catalog().iter().find(|pattern| pattern.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_rules_compile() {
        for rule in RULES {
            assert!(compile(rule).is_ok(), "rule {} failed to compile", rule.id);
        }
        assert_eq!(catalog().len(), RULES.len());
    }

    #[test]
    fn test_rule_ids_unique() {
        let ids: HashSet<_> = catalog().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_every_entry_is_fully_documented() {
        for pattern in catalog() {
            assert!(!pattern.description.is_empty(), "{} has no description", pattern.id);
            assert!(!pattern.beginner_explanation.is_empty(), "{} has no beginner text", pattern.id);
            assert!(!pattern.architect_explanation.is_empty(), "{} has no architect text", pattern.id);
            assert!(!pattern.safe_alternative.is_empty(), "{} has no safe alternative", pattern.id);
            assert!(!pattern.learning_note.is_empty(), "{} has no learning note", pattern.id);
        }
    }

    #[test]
    fn test_patterns_are_unanchored() {
        for pattern in catalog() {
            assert!(!pattern.pattern().starts_with('^'), "{} is anchored", pattern.id);
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let drop = find_pattern("drop-database").unwrap();
        assert!(drop.matches("DROP DATABASE customers;"));
        assert!(drop.matches("drop database customers;"));

        let rm = find_pattern("rm-rf-root").unwrap();
        assert!(rm.matches("RM -RF /"));
    }

    #[test]
    fn test_rm_flag_spellings() {
        let rm = find_pattern("rm-rf-root").unwrap();
        for cmd in [
            "rm -rf /",
            "rm -fr /",
            "rm -Rf /var",
            "rm -r -f /tmp/x",
            "rm --recursive --force ~",
            "rm -rf *",
            "rm -rf -- /",
            "rm -r -f -- ~",
            "rm -rf --no-preserve-root /",
        ] {
            assert!(rm.matches(cmd), "expected match for {cmd}");
        }
        assert!(!rm.matches("rm -rf ./build"));
        assert!(!rm.matches("rm file.txt"));
    }

    #[test]
    fn test_rm_variable_spellings() {
        let rm = find_pattern("rm-rf-variable").unwrap();
        assert!(rm.matches("rm -rf $BACKUP_DIR"));
        assert!(rm.matches("rm -rf \"${BUILD_DIR}\""));
        assert!(rm.matches("rm -rf -- \"$DIR\""));
        assert!(rm.matches("rm -rf -- $BACKUP_DIR"));
        assert!(!rm.matches("rm -rf ./$"));
    }

    #[test]
    fn test_sudo_unrestricted_forms() {
        let sudo = find_pattern("sudo-unrestricted").unwrap();
        for cmd in ["sudo -s", "sudo -i", "sudo su", "sudo su -", "sudo bash", "sudo", "sudo  "] {
            assert!(sudo.matches(cmd), "expected match for {cmd:?}");
        }
        for cmd in ["sudo systemctl restart nginx", "sudo -l", "sudo -u postgres psql", "sudo apt update"] {
            assert!(!sudo.matches(cmd), "unexpected match for {cmd:?}");
        }
    }

    #[test]
    fn test_remote_pipe_shell() {
        let pipe = find_pattern("remote-pipe-shell").unwrap();
        assert!(pipe.matches("curl -fsSL https://get.example.com | bash"));
        assert!(pipe.matches("wget -qO- https://x.io/install | sudo sh"));
        assert!(pipe.matches("curl https://x.io/a.py | python3"));
        assert!(!pipe.matches("curl -o script.sh https://example.com/script.sh"));
        assert!(!pipe.matches("curl https://api.example.com | jq ."));
    }

    #[test]
    fn test_hardcoded_secret() {
        let secret = find_pattern("hardcoded-secret").unwrap();
        assert!(secret.matches("export API_KEY='abcd1234efgh'"));
        assert!(secret.matches("password = \"hunter2hunter2\""));
        assert!(secret.matches("GITHUB_TOKEN=\"ghp_0123456789\""));
        assert!(secret.matches("password='P@ssw0rd!x'"));
        assert!(!secret.matches("password = \"short\""));
        assert!(!secret.matches("password = \"two words\""));
        assert!(!secret.matches("export API_KEY=$API_KEY"));
    }

    #[test]
    fn test_git_force_push_excludes_lease() {
        let push = find_pattern("git-force-push").unwrap();
        assert!(push.matches("git push -f origin main"));
        assert!(push.matches("git push origin main --force"));
        assert!(!push.matches("git push --force-with-lease origin main"));
        assert!(!push.matches("git push origin main"));
    }

    #[test]
    fn test_find_delete_variants() {
        let find = find_pattern("find-delete").unwrap();
        assert!(find.matches("find . -name '*.tmp' -delete"));
        assert!(find.matches(r"find /var/log -mtime +30 -exec rm {} \;"));
        assert!(!find.matches("find . -name '*.py'"));
    }

    #[test]
    fn test_chmod_variants() {
        let wide = find_pattern("chmod-world-writable").unwrap();
        assert!(wide.matches("chmod 777 deploy.sh"));
        assert!(wide.matches("chmod -R 0777 /srv/www"));
        assert!(!wide.matches("chmod 755 deploy.sh"));

        let none = find_pattern("chmod-remove-all").unwrap();
        assert!(none.matches("chmod 000 secrets.txt"));
        assert!(!none.matches("chmod 600 secrets.txt"));
    }
}
