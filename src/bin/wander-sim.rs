use async_bumperbot::hal::RngSource;
use async_bumperbot::{
    BehaviorController, Config, MotionTranslator, SensorSampler, SharedState, TimerDelay,
};
use bumperbot_wander::{Arena, SimRobot, StdClock};
use embassy_executor::{task, Executor};
use rand::{rngs::StdRng, SeedableRng};
use static_cell::StaticCell;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type Robot = &'static SimRobot;
type Delay = TimerDelay<StdClock>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    static EXECUTOR: StaticCell<Executor> = StaticCell::new();
    static ROBOT: StaticCell<SimRobot> = StaticCell::new();
    static STATE: SharedState = SharedState::new();

    let config = Config::default();
    if let Err(err) = config.validate() {
        error!(?err, "invalid configuration");
        return;
    }

    let robot: Robot = ROBOT.init(SimRobot::new(Arena::default()));
    let (touch, motion) = STATE.split().unwrap();

    let sampler = SensorSampler::new(touch, robot, Delay::new(), config.sample_period_ms);
    let translator = MotionTranslator::new(
        &STATE,
        robot,
        Delay::new(),
        config.motion_period_ms,
        config.creep,
    );
    let controller = BehaviorController::new(
        motion,
        robot,
        robot,
        Delay::new(),
        RngSource(StdRng::from_os_rng()),
        config,
    );

    info!("bumperbot wander simulation");

    let executor = EXECUTOR.init(Executor::new());
    executor.run(move |spawner| {
        spawner.spawn(sensors(sampler)).unwrap();
        spawner.spawn(motors(translator)).unwrap();
        spawner.spawn(behavior(controller)).unwrap();
    })
}

#[task]
async fn sensors(mut sampler: SensorSampler<'static, Robot, Delay>) -> ! {
    sampler.run().await
}

#[task]
async fn motors(mut translator: MotionTranslator<'static, Robot, Delay>) -> ! {
    translator.run().await
}

#[task]
async fn behavior(
    mut controller: BehaviorController<'static, Robot, Robot, Delay, RngSource<StdRng>>,
) -> ! {
    controller.run().await
}
