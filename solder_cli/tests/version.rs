use assert_cmd::Command;
use rstest::rstest;
use similar_asserts::assert_eq;
use solder_core::AnyEmptyResult;

#[rstest]
#[case::major("ver_maj", "2.0.0.0")]
#[case::minor("ver_min", "1.3.0.0")]
#[case::fix("ver_fix", "1.2.8.0")]
#[case::dev("ver_dev", "1.2.7.5")]
fn build_tokens_bump_the_matching_component(
	#[case] token: &str,
	#[case] expected: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.lua"), "return 0\n")?;
	std::fs::write(
		tmp.path().join("info.lua"),
		"Info = {\n\tBuildVersion = \"1.2.7.4\",\n}\n",
	)?;

	let mut cmd = Command::cargo_bin("solder")?;
	cmd.env("NO_COLOR", "1")
		.arg(token)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(format!(
			"BuildVersion 1.2.7.4 -> {expected}"
		)));

	let info = std::fs::read_to_string(tmp.path().join("info.lua"))?;
	assert_eq!(
		info,
		format!("Info = {{\n\tBuildVersion = \"{expected}\",\n}}\n")
	);

	Ok(())
}

#[test]
fn default_build_is_a_dev_bump() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.lua"), "return 0\n")?;
	std::fs::write(
		tmp.path().join("info.lua"),
		"Info = {\n\tBuildVersion = \"1.0.0.0\",\n}\n",
	)?;

	let mut cmd = Command::cargo_bin("solder")?;
	cmd.env("NO_COLOR", "1")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("BuildVersion 1.0.0.0 -> 1.0.0.1"));

	Ok(())
}

#[test]
fn config_build_token_applies_when_no_flag_is_given() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("solder.toml"), "build = \"ver_maj\"\n")?;
	std::fs::write(tmp.path().join("main.lua"), "return 0\n")?;
	std::fs::write(
		tmp.path().join("info.lua"),
		"Info = {\n\tBuildVersion = \"1.4.2.9\",\n}\n",
	)?;

	let mut cmd = Command::cargo_bin("solder")?;
	cmd.env("NO_COLOR", "1")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("BuildVersion 1.4.2.9 -> 2.0.0.0"));

	Ok(())
}

#[test]
fn command_line_token_overrides_config_build() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("solder.toml"), "build = \"ver_maj\"\n")?;
	std::fs::write(tmp.path().join("main.lua"), "return 0\n")?;
	std::fs::write(
		tmp.path().join("info.lua"),
		"Info = {\n\tBuildVersion = \"1.0.0.0\",\n}\n",
	)?;

	let mut cmd = Command::cargo_bin("solder")?;
	cmd.env("NO_COLOR", "1")
		.arg("ver_dev")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("BuildVersion 1.0.0.0 -> 1.0.0.1"));

	Ok(())
}

#[test]
fn guid_placeholder_is_replaced_once() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.lua"), "return 0\n")?;
	std::fs::write(
		tmp.path().join("info.lua"),
		"Info = {\n\tId = \"<guid>\",\n\tBuildVersion = \"1.0.0.0\",\n}\n",
	)?;

	let mut cmd = Command::cargo_bin("solder")?;
	cmd.env("NO_COLOR", "1")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Assigned plugin id"));

	let info = std::fs::read_to_string(tmp.path().join("info.lua"))?;
	assert!(!info.contains("<guid>"));

	Ok(())
}

#[test]
fn short_versions_are_padded_before_the_bump() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("main.lua"), "return 0\n")?;
	std::fs::write(
		tmp.path().join("info.lua"),
		"Info = {\n\tBuildVersion = \"2.1\",\n}\n",
	)?;

	let mut cmd = Command::cargo_bin("solder")?;
	cmd.env("NO_COLOR", "1")
		.arg("ver_fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("BuildVersion 2.1 -> 2.1.1.0"));

	let info = std::fs::read_to_string(tmp.path().join("info.lua"))?;
	assert!(info.contains("BuildVersion = \"2.1.1.0\""));

	Ok(())
}
