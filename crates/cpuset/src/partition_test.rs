#[cfg(test)]
mod tests {
    use crate::error::CpusetError;
    use crate::filesystem::{FileSystem, MemoryFileSystem, Operation, RealFileSystem};
    use crate::partition::{EXCLUSIVE_CPUS_FILE, PARTITION_FILE, PROCS_FILE};
    use crate::CpusetPartition;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const ROOT: &str = "/sys/fs/cgroup";

    fn setup_mock_fs() -> MemoryFileSystem {
        MemoryFileSystem::with_root(ROOT)
    }

    fn setup_partition(fs: &MemoryFileSystem, cpus: &str) -> CpusetPartition {
        CpusetPartition::build()
            .name("cleanroom")
            .cpus(cpus)
            .with_fs(fs.clone())
            .build()
            .unwrap()
    }

    fn partition_dir() -> PathBuf {
        PathBuf::from(ROOT).join("cleanroom")
    }

    #[test]
    fn test_builder() {
        let partition = CpusetPartition::build()
            .name("cleanroom")
            .cpus("1-2,4")
            .root("/tmp/cg")
            .build()
            .unwrap();

        assert_eq!(partition.name(), "cleanroom");
        assert_eq!(partition.cpus(), "1-2,4");
        assert_eq!(partition.path(), Path::new("/tmp/cg/cleanroom"));
    }

    #[test]
    fn test_builder_defaults_to_sys_fs_cgroup() {
        let partition = CpusetPartition::build()
            .name("cleanroom")
            .cpus("1")
            .build()
            .unwrap();
        assert_eq!(partition.path(), Path::new("/sys/fs/cgroup/cleanroom"));
    }

    #[test]
    fn test_builder_requires_cpus() {
        let mock_fs = setup_mock_fs();
        let result = CpusetPartition::build()
            .name("cleanroom")
            .with_fs(mock_fs.clone())
            .build();
        assert!(matches!(result, Err(CpusetError::MissingCpus(ref name)) if name == "cleanroom"));

        let result = CpusetPartition::build().name("cleanroom").cpus("").build();
        assert!(matches!(result, Err(CpusetError::MissingCpus(_))));

        assert!(mock_fs.calls().is_empty());
    }

    #[test]
    fn test_builder_without_name() {
        let result = CpusetPartition::build().build();
        assert!(matches!(result, Err(CpusetError::InvalidName(_))));
    }

    #[test]
    fn test_builder_rejects_path_like_names() {
        for name in ["", ".", "..", "a/b", "../escape"] {
            let result = CpusetPartition::build().name(name).build();
            assert!(
                matches!(result, Err(CpusetError::InvalidName(_))),
                "name {:?} was accepted",
                name
            );
        }
    }

    #[test]
    fn test_create_writes_mode_then_cpus() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2,4");

        partition.create().unwrap();

        assert!(mock_fs.exists(&partition_dir()));
        assert_eq!(
            mock_fs.file(partition_dir().join(PARTITION_FILE)).as_deref(),
            Some("root")
        );
        assert_eq!(
            mock_fs.file(partition_dir().join(EXCLUSIVE_CPUS_FILE)).as_deref(),
            Some("1-2,4")
        );

        let writes: Vec<PathBuf> = mock_fs
            .calls()
            .into_iter()
            .filter(|(op, _)| *op == Operation::Write)
            .map(|(_, path)| path)
            .collect();
        assert_eq!(
            writes,
            vec![
                partition_dir().join(PARTITION_FILE),
                partition_dir().join(EXCLUSIVE_CPUS_FILE)
            ]
        );
    }

    #[test]
    fn test_create_is_idempotent() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");

        assert!(partition.create().is_ok());
        assert!(partition.create().is_ok());
        assert_eq!(mock_fs.count(Operation::CreateDir), 2);
    }

    #[test]
    fn test_create_without_cgroup_root() {
        let mock_fs = MemoryFileSystem::new();
        let partition = setup_partition(&mock_fs, "1-2");

        let result = partition.create();
        assert!(matches!(result, Err(CpusetError::Setup { .. })));
        assert_eq!(mock_fs.count(Operation::Write), 0);
    }

    #[test]
    fn test_create_partition_mode_failure() {
        let mock_fs = setup_mock_fs();
        mock_fs.fail_on(Operation::Write, partition_dir().join(PARTITION_FILE));
        let partition = setup_partition(&mock_fs, "1-2");

        match partition.create() {
            Err(CpusetError::Setup { path, .. }) => {
                assert_eq!(path, partition_dir().join(PARTITION_FILE))
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
        // the cpu list is never attempted
        assert!(mock_fs.file(partition_dir().join(EXCLUSIVE_CPUS_FILE)).is_none());
    }

    #[test]
    fn test_create_exclusive_cpus_failure_keeps_partial_state() {
        let mock_fs = setup_mock_fs();
        mock_fs.fail_on(Operation::Write, partition_dir().join(EXCLUSIVE_CPUS_FILE));
        let partition = setup_partition(&mock_fs, "0-1");

        let result = partition.create();
        assert!(matches!(result, Err(CpusetError::Setup { .. })));
        assert!(mock_fs.exists(&partition_dir()));
        assert_eq!(
            mock_fs.file(partition_dir().join(PARTITION_FILE)).as_deref(),
            Some("root")
        );
        assert_eq!(mock_fs.count(Operation::RemoveDir), 0);
    }

    #[test]
    fn test_add_process() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");
        partition.create().unwrap();

        assert!(partition.add_process(1234).is_ok());
        assert_eq!(
            mock_fs.file(partition_dir().join(PROCS_FILE)).as_deref(),
            Some("1234")
        );
    }

    #[test]
    fn test_add_process_failure() {
        let mock_fs = setup_mock_fs();
        mock_fs.fail_on(Operation::Write, partition_dir().join(PROCS_FILE));
        let partition = setup_partition(&mock_fs, "1-2");
        partition.create().unwrap();

        let result = partition.add_process(1234);
        assert!(matches!(
            result,
            Err(CpusetError::Assign { pid: 1234, .. })
        ));
    }

    #[test]
    fn test_delete_success() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");
        partition.create().unwrap();

        assert!(partition.delete().is_ok());
        assert!(!mock_fs.exists(&partition_dir()));
    }

    #[test]
    fn test_delete_missing_partition_is_noop() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");

        assert!(partition.delete().is_ok());
        assert_eq!(mock_fs.count(Operation::RemoveDir), 0);
    }

    #[test]
    fn test_delete_failed() {
        let mock_fs = setup_mock_fs();
        mock_fs.fail_on(Operation::RemoveDir, partition_dir());
        let partition = setup_partition(&mock_fs, "1-2");
        partition.create().unwrap();

        let result = partition.delete();
        assert!(matches!(result, Err(CpusetError::Teardown { .. })));
        assert!(mock_fs.exists(&partition_dir()));
    }

    #[test]
    fn test_partition_mode_is_trimmed() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");
        partition.create().unwrap();
        mock_fs
            .write(
                &partition_dir().join(PARTITION_FILE),
                b"root invalid (Cpu list in cpuset.cpus not exclusive)\n",
            )
            .unwrap();

        assert_eq!(
            partition.partition_mode().unwrap(),
            "root invalid (Cpu list in cpuset.cpus not exclusive)"
        );
    }

    #[test]
    fn test_guard_release_deletes_once() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");

        let guard = partition.acquire().unwrap();
        guard.add_process(42).unwrap();
        guard.release();

        assert!(!mock_fs.exists(&partition_dir()));
        assert_eq!(mock_fs.count(Operation::RemoveDir), 1);
    }

    #[test]
    fn test_guard_drop_deletes() {
        let mock_fs = setup_mock_fs();
        let partition = setup_partition(&mock_fs, "1-2");

        {
            let _guard = partition.acquire().unwrap();
            assert!(mock_fs.exists(&partition_dir()));
        }

        assert!(!mock_fs.exists(&partition_dir()));
        assert_eq!(mock_fs.count(Operation::RemoveDir), 1);
    }

    #[test]
    fn test_guard_swallows_teardown_error() {
        let mock_fs = setup_mock_fs();
        mock_fs.fail_on(Operation::RemoveDir, partition_dir());
        let partition = setup_partition(&mock_fs, "1-2");

        let guard = partition.acquire().unwrap();
        guard.release();

        assert_eq!(mock_fs.count(Operation::RemoveDir), 1);
        assert!(mock_fs.exists(&partition_dir()));
    }

    #[test]
    fn test_acquire_failure_returns_no_guard() {
        let mock_fs = setup_mock_fs();
        mock_fs.fail_on(Operation::Write, partition_dir().join(PARTITION_FILE));
        let partition = setup_partition(&mock_fs, "1-2");

        assert!(partition.acquire().is_err());
        assert_eq!(mock_fs.count(Operation::RemoveDir), 0);
    }

    #[test]
    fn test_real_filesystem_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let partition = CpusetPartition::build()
            .name("cleanroom")
            .cpus("3")
            .root(tmp.path())
            .with_fs(RealFileSystem)
            .build()
            .unwrap();

        partition.create().unwrap();
        let dir = tmp.path().join("cleanroom");
        assert_eq!(
            std::fs::read_to_string(dir.join(PARTITION_FILE)).unwrap(),
            "root"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join(EXCLUSIVE_CPUS_FILE)).unwrap(),
            "3"
        );

        // on a plain filesystem the control files are real, so rmdir refuses
        assert!(matches!(
            partition.delete(),
            Err(CpusetError::Teardown { .. })
        ));
    }
}
