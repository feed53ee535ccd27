use anyhow::Result;
use covid_analysis::{
    aggregate::{AVG_CASES, TOP_CASES, VACCINATION},
    config::Args,
    output::{part_files, SUCCESS_MARKER},
    pipeline,
};
use clap::Parser;
use std::{fs, path::Path};
use tempfile::tempdir;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,covid_analysis=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(input: &Path, output: &Path, extra: &[&str]) -> Result<String> {
    let mut argv = vec![
        "covid-analysis".to_string(),
        "--input".into(),
        input.display().to_string(),
        "--output".into(),
        output.display().to_string(),
        "--threads".into(),
        "2".into(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    let config = Args::try_parse_from(argv)?.into_config()?;

    let mut stdout = Vec::new();
    pipeline::run(&config, &mut stdout)?;
    Ok(String::from_utf8(stdout)?)
}

fn read_result(dir: &Path) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for part in part_files(dir)? {
        for line in fs::read_to_string(part)?.lines() {
            rows.push(line.split(',').map(str::to_string).collect());
        }
    }
    Ok(rows)
}

#[test]
fn two_row_example_end_to_end() -> Result<()> {
    init_test_logging();
    let work = tempdir()?;
    let input = work.path().join("owid.csv");
    fs::write(
        &input,
        "date,location,total_cases,new_cases\n\
         2020-01-01,A,10,10\n\
         2020-01-02,A,15,5\n",
    )?;
    let out = work.path().join("out");

    let stdout = run(&input, &out, &[])?;

    assert_eq!(read_result(&out.join(TOP_CASES))?, vec![vec!["A", "15"]]);

    let avg = read_result(&out.join(AVG_CASES))?;
    assert_eq!(avg.len(), 2);
    assert_eq!(avg[0][0], "2020-01-01");
    assert_eq!(avg[0][1].parse::<f64>()?, 10.0);
    assert_eq!(avg[1][0], "2020-01-02");
    assert_eq!(avg[1][1].parse::<f64>()?, 5.0);

    assert!(out.join(TOP_CASES).join(SUCCESS_MARKER).exists());
    assert!(!out.join(VACCINATION).exists());

    assert!(stdout.contains("=== Top Countries by Total Cases (sample) ==="));
    assert!(stdout.contains("=== Average New Cases per Day (sample) ==="));
    assert!(!stdout.contains("People Vaccinated"));
    Ok(())
}

#[test]
fn vaccination_written_when_column_present() -> Result<()> {
    init_test_logging();
    let work = tempdir()?;
    let input = work.path().join("owid.csv");
    fs::write(
        &input,
        "date,location,total_cases,new_cases,people_vaccinated\n\
         2021-01-01,A,10,10,\n\
         2021-01-01,B,30,30,500\n\
         2021-01-02,A,12,2,900\n\
         2021-01-02,B,31,1,\n",
    )?;
    let out = work.path().join("out");

    let stdout = run(&input, &out, &["--header"])?;

    assert_eq!(
        read_result(&out.join(VACCINATION))?,
        vec![
            vec!["location", "max_vaccinated"],
            vec!["A", "900"],
            vec!["B", "500"],
        ]
    );
    assert_eq!(
        read_result(&out.join(TOP_CASES))?,
        vec![
            vec!["location", "max_cases"],
            vec!["B", "31"],
            vec!["A", "12"],
        ]
    );
    assert!(stdout.contains("=== Top Countries by People Vaccinated (sample) ==="));
    Ok(())
}

#[test]
fn rerun_overwrites_previous_output() -> Result<()> {
    init_test_logging();
    let work = tempdir()?;
    let out = work.path().join("out");

    let first = work.path().join("first.csv");
    fs::write(
        &first,
        "date,location,total_cases,new_cases,people_vaccinated\n\
         2020-01-01,A,1,1,1\n2020-01-01,B,2,2,2\n2020-01-01,C,3,3,3\n",
    )?;
    run(&first, &out, &["--partitions", "3"])?;
    assert_eq!(part_files(&out.join(TOP_CASES))?.len(), 3);
    assert!(out.join(VACCINATION).exists());

    let second = work.path().join("second.csv");
    fs::write(
        &second,
        "date,location,total_cases,new_cases\n2020-01-01,Z,9,9\n",
    )?;
    run(&second, &out, &[])?;

    let top = out.join(TOP_CASES);
    assert_eq!(part_files(&top)?.len(), 1);
    assert_eq!(read_result(&top)?, vec![vec!["Z", "9"]]);
    assert_eq!(fs::read_dir(&top)?.count(), 2);
    // no people_vaccinated this time, so the earlier result must not linger
    assert!(!out.join(VACCINATION).exists());
    Ok(())
}

#[test]
fn multi_part_output_preserves_global_order() -> Result<()> {
    init_test_logging();
    let work = tempdir()?;
    let input = work.path().join("owid.csv");
    let mut csv = String::from("date,location,total_cases,new_cases\n");
    for i in 0..25 {
        csv.push_str(&format!("2020-02-{:02},L{:02},{},{}\n", i % 28 + 1, i, i * 10, i));
    }
    fs::write(&input, csv)?;
    let out = work.path().join("out");

    let stdout = run(&input, &out, &["--partitions", "4", "--preview-rows", "5"])?;

    let top = read_result(&out.join(TOP_CASES))?;
    assert_eq!(top.len(), 25);
    let maxima: Vec<i64> = top.iter().map(|r| r[1].parse::<i64>()).collect::<Result<_, _>>()?;
    assert!(maxima.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(part_files(&out.join(TOP_CASES))?.len(), 4);

    let dates: Vec<String> = read_result(&out.join(AVG_CASES))?
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    assert!(stdout.contains("only showing top 5 rows"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn file_uri_and_directory_input() -> Result<()> {
    init_test_logging();
    let work = tempdir()?;
    let input = work.path().join("input");
    fs::create_dir_all(&input)?;
    fs::write(
        input.join("part-00000.csv"),
        "date,location,total_cases,new_cases\n2020-01-01,A,10,4\n",
    )?;
    fs::write(
        input.join("part-00001.csv"),
        "date,location,total_cases,new_cases\n2020-01-01,A,12,8\n",
    )?;
    let out = work.path().join("out");

    let argv = vec![
        "covid-analysis".to_string(),
        "--input".into(),
        format!("file://{}", input.display()),
        "--output".into(),
        out.display().to_string(),
    ];
    let config = Args::try_parse_from(argv)?.into_config()?;
    pipeline::run(&config, &mut Vec::new())?;

    assert_eq!(read_result(&out.join(TOP_CASES))?, vec![vec!["A", "12"]]);
    let avg = read_result(&out.join(AVG_CASES))?;
    assert_eq!(avg[0][1].parse::<f64>()?, 6.0);
    Ok(())
}

#[test]
fn missing_input_fails() -> Result<()> {
    init_test_logging();
    let work = tempdir()?;
    let result = run(&work.path().join("absent.csv"), &work.path().join("out"), &[]);
    assert!(result.is_err());
    assert!(!work.path().join("out").exists());
    Ok(())
}
