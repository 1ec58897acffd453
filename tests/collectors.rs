use glass::collectors::{CpuCollector, DiskCollector, MemoryCollector, NetworkCollector};
use glass::metrics::{
    AddressFamily, ConnectionKind, ConnectionStat, CpuInfoStat, CpuTimesStat, DiskUsageStat, IoCountersStat,
    SocketAddr, VirtualMemoryStat,
};
use glass::report::SinkEvent;
use glass::{
    default_collectors, register_collectors, run_collectors, CollectError, Collector, CollectorKind, Config,
    MemorySink, MetricsSource, ProcfsSource, Report, SourceError,
};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Canned readings; a `None` field makes that query fail.
#[derive(Default)]
struct StubSource {
    cpu_info: Option<Vec<CpuInfoStat>>,
    cpu_times: Option<Vec<CpuTimesStat>>,
    cpu_count: Option<usize>,
    memory: Option<VirtualMemoryStat>,
    disk: Option<DiskUsageStat>,
    counters: Option<Vec<IoCountersStat>>,
    connections: Option<Vec<ConnectionStat>>,
    per_cpu_requests: Mutex<Vec<bool>>,
}

fn reading<T: Clone>(value: &Option<T>, query: &'static str) -> Result<T, SourceError> {
    value.clone().ok_or(SourceError::Unsupported(query))
}

impl StubSource {
    fn healthy() -> Self {
        Self {
            cpu_info: Some(vec![cpu(0), cpu(1)]),
            cpu_times: Some(vec![CpuTimesStat {
                cpu: "cpu-total".to_string(),
                user: 12.5,
                idle: 300.0,
                ..Default::default()
            }]),
            cpu_count: Some(8),
            memory: Some(VirtualMemoryStat {
                total: 1000,
                available: 400,
                used: 600,
                free: 400,
                used_percent: 60.0,
            }),
            disk: Some(DiskUsageStat::default()),
            counters: Some(vec![nic("eth0", 100, 200), nic("lo", 5, 5)]),
            connections: Some(Vec::new()),
            per_cpu_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MetricsSource for StubSource {
    fn cpu_info(&self) -> Result<Vec<CpuInfoStat>, SourceError> {
        reading(&self.cpu_info, "cpu_info")
    }

    fn cpu_times(&self, per_cpu: bool) -> Result<Vec<CpuTimesStat>, SourceError> {
        self.per_cpu_requests.lock().unwrap().push(per_cpu);
        reading(&self.cpu_times, "cpu_times")
    }

    fn cpu_count(&self, _logical: bool) -> Result<usize, SourceError> {
        reading(&self.cpu_count, "cpu_count")
    }

    fn virtual_memory(&self) -> Result<VirtualMemoryStat, SourceError> {
        reading(&self.memory, "virtual_memory")
    }

    fn disk_usage(&self, path: &Path) -> Result<DiskUsageStat, SourceError> {
        let mut usage = reading(&self.disk, "disk_usage")?;
        usage.path = path.to_string_lossy().to_string();
        Ok(usage)
    }

    fn net_io_counters(&self, _per_nic: bool) -> Result<Vec<IoCountersStat>, SourceError> {
        reading(&self.counters, "net_io_counters")
    }

    fn net_connections(&self, _kind: ConnectionKind) -> Result<Vec<ConnectionStat>, SourceError> {
        reading(&self.connections, "net_connections")
    }
}

fn cpu(index: u32) -> CpuInfoStat {
    CpuInfoStat {
        cpu: index,
        vendor_id: "AuthenticAMD".to_string(),
        model_name: "AMD EPYC".to_string(),
        mhz: 2450.0,
        cores: 4,
        cache_size: 512,
        physical_id: None,
        core_id: None,
    }
}

fn nic(name: &str, sent: u64, recv: u64) -> IoCountersStat {
    IoCountersStat {
        name: name.to_string(),
        bytes_sent: sent,
        bytes_recv: recv,
        packets_sent: 0,
        packets_recv: 0,
    }
}

fn connection(status: &str) -> ConnectionStat {
    ConnectionStat {
        family: AddressFamily::Inet,
        kind: ConnectionKind::Tcp,
        local: SocketAddr {
            ip: "10.0.0.2".to_string(),
            port: 43210,
        },
        remote: SocketAddr {
            ip: "10.0.0.9".to_string(),
            port: 443,
        },
        status: status.to_string(),
        pid: Some(77),
    }
}

#[test]
fn registry_returns_all_four_in_order() {
    let collectors = default_collectors(Arc::new(StubSource::healthy()));
    let kinds: Vec<CollectorKind> = collectors.iter().map(|c| c.kind()).collect();
    assert_eq!(kinds, CollectorKind::ALL);
    let names: Vec<&str> = collectors.iter().map(|c| c.name()).collect();
    assert_eq!(names, ["cpu", "memory", "disk", "network"]);
}

#[test]
fn cpu_failure_does_not_stop_other_collectors() {
    let source = StubSource {
        cpu_info: None,
        cpu_times: None,
        cpu_count: None,
        ..StubSource::healthy()
    };
    let collectors = default_collectors(Arc::new(source));
    let mut sink = MemorySink::new();

    let summary = run_collectors(&collectors, &mut sink);

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(sink.failures(), ["cpu"]);
    assert!(sink.records_in("cpu_info").is_empty());
    assert_eq!(sink.records_in("memory").len(), 1);
    assert_eq!(sink.records_in("disk").len(), 1);
    assert_eq!(sink.records_in("interface").len(), 2);
}

#[test]
fn every_collector_failing_still_runs_all() {
    let collectors = default_collectors(Arc::new(StubSource::default()));
    let mut sink = MemorySink::new();

    let summary = run_collectors(&collectors, &mut sink);

    assert_eq!(summary.failed, 4);
    assert_eq!(sink.failures(), ["cpu", "memory", "disk", "network"]);
    assert_eq!(sink.records().count(), 0);
}

#[test]
fn empty_cpu_list_is_no_data() {
    let source = StubSource {
        cpu_info: Some(Vec::new()),
        ..StubSource::healthy()
    };
    let collector = CpuCollector::new(Arc::new(source));

    let err = collector.cpu_information().unwrap_err();
    assert!(matches!(err, CollectError::NoData("cpu info")));

    // times are still reported when identity is missing
    let mut sink = MemorySink::new();
    let result = collector.collect(&mut sink);
    assert!(matches!(result, Err(CollectError::NoData(_))));
    assert!(sink.records_in("cpu_info").is_empty());
    assert_eq!(sink.records_in("cpu_times").len(), 1);
}

#[test]
fn cpu_information_uses_first_processor() {
    let collector = CpuCollector::new(Arc::new(StubSource::healthy()));
    let info = collector.cpu_information().unwrap();
    assert_eq!(info.vendor, "AuthenticAMD");
    assert_eq!(info.frequency, 2450.0);
    assert_eq!(info.cores, 4);
    assert_eq!(info.cache, 512);
    assert_eq!(info.vcpu, 2);
}

#[test]
fn cpu_collect_reports_logical_count() {
    let collector = CpuCollector::new(Arc::new(StubSource::healthy()));
    let mut sink = MemorySink::new();
    collector.collect(&mut sink).unwrap();

    let info = sink.records_in("cpu_info");
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].to_json()["vcpu"], 8);
}

#[test]
fn cpu_sub_query_failures_are_combined() {
    let source = StubSource {
        cpu_count: None,
        cpu_times: None,
        ..StubSource::healthy()
    };
    let collector = CpuCollector::new(Arc::new(source));
    let mut sink = MemorySink::new();

    let err = collector.collect(&mut sink).unwrap_err();
    match err {
        CollectError::Multiple(errors) => assert_eq!(errors.len(), 2),
        other => panic!("expected combined error, got {other:?}"),
    }

    // identity still reported, vcpu falls back to the info list
    let info = sink.records_in("cpu_info");
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].to_json()["vcpu"], 2);
}

#[test]
fn per_cpu_setting_reaches_the_source() {
    let source = Arc::new(StubSource::healthy());
    let config = Config {
        per_cpu: true,
        collectors: vec![CollectorKind::Cpu],
        ..Config::default()
    };
    let collectors = register_collectors(&config, source.clone());
    run_collectors(&collectors, &mut MemorySink::new());
    assert_eq!(*source.per_cpu_requests.lock().unwrap(), [true]);
}

#[test]
fn repeated_collection_produces_independent_records() {
    let source: Arc<dyn MetricsSource> = Arc::new(StubSource::healthy());
    let memory = MemoryCollector::new(source.clone());
    let cpu = CpuCollector::new(source);
    let mut sink = MemorySink::new();

    memory.collect(&mut sink).unwrap();
    memory.collect(&mut sink).unwrap();
    cpu.collect(&mut sink).unwrap();
    cpu.collect(&mut sink).unwrap();

    let records = sink.records_in("memory");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
    assert_eq!(sink.records_in("cpu_info").len(), 2);
    assert_eq!(sink.records_in("cpu_times").len(), 2);
}

#[test]
fn memory_record_has_exactly_five_fields() {
    let collector = MemoryCollector::new(Arc::new(StubSource::healthy()));
    let mut sink = MemorySink::new();
    collector.collect(&mut sink).unwrap();

    let records: Vec<&Report> = sink.records().collect();
    assert_eq!(records.len(), 1);
    let json = records[0].to_json();
    let fields = json.as_object().unwrap();
    let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["available", "free", "total", "used", "used_percent"]);
    assert_eq!(json["total"], 1000);
    assert_eq!(json["available"], 400);
    assert_eq!(json["used"], 600);
    assert_eq!(json["free"], 400);
    assert_eq!(json["used_percent"], 60.0);
}

#[test]
fn network_reports_each_interface_and_no_connections() {
    let collector = NetworkCollector::new(Arc::new(StubSource::healthy()));
    let mut sink = MemorySink::new();

    collector.collect(&mut sink).unwrap();

    let interfaces = sink.records_in("interface");
    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[0].to_json()["name"], "eth0");
    assert_eq!(interfaces[0].to_json()["bytes_sent"], 100);
    assert_eq!(interfaces[0].to_json()["bytes_recv"], 200);
    assert_eq!(interfaces[1].to_json()["name"], "lo");
    assert!(sink.records_in("connection").is_empty());
    assert_eq!(sink.events.len(), 2);
}

#[test]
fn network_logs_only_established_connections() {
    let source = StubSource {
        connections: Some(vec![connection("LISTEN"), connection("ESTABLISHED"), connection("TIME_WAIT")]),
        ..StubSource::healthy()
    };
    let collector = NetworkCollector::new(Arc::new(source));
    let mut sink = MemorySink::new();

    collector.collect(&mut sink).unwrap();

    let connections = sink.records_in("connection");
    assert_eq!(connections.len(), 1);
    let json = connections[0].to_json();
    assert_eq!(json["status"], "ESTABLISHED");
    assert_eq!(json["remote"]["port"], 443);
    assert_eq!(json["pid"], 77);
}

#[test]
fn connection_failure_is_suppressed() {
    let source = StubSource {
        connections: None,
        ..StubSource::healthy()
    };
    let collector = NetworkCollector::new(Arc::new(source));
    let mut sink = MemorySink::new();

    assert!(collector.collect(&mut sink).is_ok());
    assert_eq!(sink.records_in("interface").len(), 2);
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, SinkEvent::Suppressed { collector: "network", .. })));
}

#[test]
fn counter_failure_still_reports_connections() {
    let source = StubSource {
        counters: None,
        connections: Some(vec![connection("ESTABLISHED")]),
        ..StubSource::healthy()
    };
    let collector = NetworkCollector::new(Arc::new(source));
    let mut sink = MemorySink::new();

    assert!(collector.collect(&mut sink).is_err());
    assert_eq!(sink.records_in("connection").len(), 1);
}

#[test]
fn disk_reports_configured_mount_path() {
    let collector = DiskCollector::new(Arc::new(StubSource::healthy()), "/srv/data");
    let mut sink = MemorySink::new();

    collector.collect(&mut sink).unwrap();

    let disks = sink.records_in("disk");
    assert_eq!(disks.len(), 1);
    assert_eq!(disks[0].to_json()["path"], "/srv/data");
    assert_eq!(collector.mount_path(), Path::new("/srv/data"));
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fake_proc(root: &Path) {
    write(
        root,
        "cpuinfo",
        "processor\t: 0\nvendor_id\t: GenuineIntel\ncpu MHz\t\t: 3000.000\ncache size\t: 8192 KB\ncpu cores\t: 1\n",
    );
    write(root, "stat", "cpu  100 0 50 1000 0 0 0 0 0 0\ncpu0 100 0 50 1000 0 0 0 0 0 0\n");
    write(
        root,
        "meminfo",
        "MemTotal: 2048 kB\nMemFree: 512 kB\nMemAvailable: 1024 kB\nBuffers: 0 kB\nCached: 512 kB\n",
    );
    write(
        root,
        "net/dev",
        "Inter-|   Receive\n face |bytes\n  eth0: 10 1 0 0 0 0 0 0 20 2 0 0 0 0 0 0\n",
    );
    write(
        root,
        "net/tcp",
        "  sl  local_address rem_address   st\n   0: 0100007F:1F90 0100007F:9C40 01 00000000:00000000 00:00000000 00000000  1000 0 555 1\n",
    );
}

#[test]
fn procfs_snapshot_end_to_end() {
    let proc_root = tempfile::tempdir().unwrap();
    fake_proc(proc_root.path());
    let mount = tempfile::tempdir().unwrap();

    let config = Config {
        mount_path: mount.path().to_path_buf(),
        ..Config::default()
    };
    let collectors = register_collectors(&config, Arc::new(ProcfsSource::with_root(proc_root.path())));
    let mut sink = MemorySink::new();

    let summary = run_collectors(&collectors, &mut sink);

    assert_eq!(summary.failed, 0, "{:?}", sink.events);
    let info = sink.records_in("cpu_info");
    assert_eq!(info[0].to_json()["vendor"], "GenuineIntel");
    assert_eq!(info[0].to_json()["vcpu"], 1);
    let times = sink.records_in("cpu_times");
    assert_eq!(times.len(), 1);
    assert_eq!(times[0].to_json()["cpu"], "cpu-total");
    let memory = sink.records_in("memory");
    assert_eq!(memory[0].to_json()["total"], 2048 * 1024);
    let nics = sink.records_in("interface");
    assert_eq!(nics.len(), 1);
    assert_eq!(nics[0].to_json()["name"], "all");
    assert_eq!(nics[0].to_json()["bytes_sent"], 20);
    assert_eq!(sink.records_in("connection").len(), 1);
}

#[test]
fn missing_procfs_fails_without_aborting() {
    let empty = tempfile::tempdir().unwrap();
    let config = Config {
        mount_path: empty.path().to_path_buf(),
        ..Config::default()
    };
    let collectors = register_collectors(&config, Arc::new(ProcfsSource::with_root(empty.path())));
    let mut sink = MemorySink::new();

    let summary = run_collectors(&collectors, &mut sink);

    // only the disk collector has something to read
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 3);
    assert_eq!(sink.failures(), ["cpu", "memory", "network"]);
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, SinkEvent::Suppressed { collector: "network", .. })));
}
