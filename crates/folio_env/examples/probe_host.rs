use folio_env::{detect, HostProbe, EnvironmentProbe};

fn main() {
    let mut probe = HostProbe::new();
    probe.set_viewport(1920, 1080, 1.0);

    let start = std::time::Instant::now();
    let readings = probe.readings();
    let collect_micros = start.elapsed().as_micros() as u64;
    println!("Host readings: {:#?}", readings);
    println!("Readings collected in {} microseconds", collect_micros);

    let start = std::time::Instant::now();
    let profile = detect(&probe);
    let detect_micros = start.elapsed().as_micros() as u64;
    println!("Detected profile: {:#?}", profile);
    println!("Second pass took {} microseconds (memory cached)", detect_micros);
}
